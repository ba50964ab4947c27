//! Integration tests against a live `PostgreSQL`. Run with
//! `DATABASE_URL` set and `--ignored`.

use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use voxlux_content::domain::course::{MediaType, SlotTag};
use voxlux_content::domain::store::CourseStore;
use voxlux_core::error::DomainError;
use voxlux_core::repository::{EventRepository, StoredEvent};
use voxlux_quiz::domain::quiz::QuizScore;
use voxlux_quiz::domain::result::QuizResult;
use voxlux_quiz::domain::store::QuizStore;
use voxlux_store::{PgCourseStore, PgEventRepository, PgQuizStore};

fn make_stored_event(aggregate_id: Uuid, sequence_number: i64) -> StoredEvent {
    StoredEvent {
        event_id: Uuid::new_v4(),
        aggregate_id,
        event_type: "progress.modules_completed".to_owned(),
        payload: serde_json::json!({
            "ModulesCompleted": { "user_id": aggregate_id, "module_ids": ["m-1"] }
        }),
        sequence_number,
        correlation_id: Uuid::new_v4(),
        causation_id: Uuid::new_v4(),
        occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_load_events_for_unknown_aggregate_is_empty(pool: PgPool) {
    let repo = PgEventRepository::new(pool);

    let loaded = repo.load_events(Uuid::new_v4()).await.unwrap();

    assert!(loaded.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_appended_events_load_in_sequence_order(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let aggregate_id = Uuid::new_v4();
    let other_id = Uuid::new_v4();
    let first = make_stored_event(aggregate_id, 1);

    // Act
    repo.append_events(
        aggregate_id,
        0,
        &[first.clone(), make_stored_event(aggregate_id, 2)],
    )
    .await
    .unwrap();
    repo.append_events(other_id, 0, &[make_stored_event(other_id, 1)])
        .await
        .unwrap();
    let loaded = repo.load_events(aggregate_id).await.unwrap();

    // Assert
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].event_id, first.event_id);
    assert_eq!(loaded[0].payload, first.payload);
    assert_eq!(loaded[0].occurred_at, first.occurred_at);
    assert_eq!(loaded[1].sequence_number, 2);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_expected_version_is_a_conflict(pool: PgPool) {
    // Arrange
    let repo = PgEventRepository::new(pool);
    let aggregate_id = Uuid::new_v4();
    repo.append_events(
        aggregate_id,
        0,
        &[
            make_stored_event(aggregate_id, 1),
            make_stored_event(aggregate_id, 2),
        ],
    )
    .await
    .unwrap();

    // Act
    let result = repo
        .append_events(aggregate_id, 0, &[make_stored_event(aggregate_id, 3)])
        .await;

    // Assert
    match result {
        Err(DomainError::ConcurrencyConflict {
            aggregate_id: conflict_id,
            expected,
            actual,
        }) => {
            assert_eq!(conflict_id, aggregate_id);
            assert_eq!(expected, 0);
            assert_eq!(actual, 2);
        }
        other => panic!("expected ConcurrencyConflict, got {other:?}"),
    }
    assert_eq!(repo.load_events(aggregate_id).await.unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_course_assembles_worlds_in_position_order(pool: PgPool) {
    // Arrange
    sqlx::query("INSERT INTO courses (id, title) VALUES ('podcast', 'Podcast')")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO masterminds (id, course_id, position, title) VALUES \
         ('mm-2', 'podcast', 2, 'Second'), ('mm-1', 'podcast', 1, 'First')",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO lessons (id, mastermind_id, position, title, media_type, order_index, resources, slot) VALUES \
         ('l-1b', 'mm-1', 2, 'B', 'video', 2, '[]', NULL), \
         ('l-1a', 'mm-1', 1, 'A', 'audio', 1, '[{\"label\": \"Sheet\", \"url\": \"https://cdn.example/s.pdf\"}]', 'moon'), \
         ('l-2a', 'mm-2', 1, NULL, 'text', NULL, '[]', NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();
    let store = PgCourseStore::new(pool);

    // Act
    let course = store.fetch_course("podcast").await.unwrap().unwrap();

    // Assert
    assert_eq!(course.masterminds.len(), 2);
    assert_eq!(course.masterminds[0].id, "mm-1");
    assert_eq!(course.lesson_ids(), vec!["l-1a", "l-1b", "l-2a"]);
    let first = &course.masterminds[0].lessons[0];
    assert_eq!(first.media_type, MediaType::Audio);
    assert_eq!(first.slot, Some(SlotTag::Moon));
    assert_eq!(first.resources[0].label, "Sheet");
    assert_eq!(course.masterminds[1].lessons[0].title, None);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_fetch_unknown_course_is_none(pool: PgPool) {
    let store = PgCourseStore::new(pool);

    assert!(store.fetch_course("nope").await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_quiz_store_round_trips_definitions_and_results(pool: PgPool) {
    // Arrange
    let quiz_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO quizzes (id, module_id, title, passing_score, questions) \
         VALUES ($1, 'l-1a', 'Check-in', 60, $2)",
    )
    .bind(quiz_id)
    .bind(serde_json::json!([
        { "prompt": "Best mic?", "options": [
            { "text": "Dynamic", "correct": true },
            { "text": "Toaster" }
        ]}
    ]))
    .execute(&pool)
    .await
    .unwrap();
    let store = PgQuizStore::new(pool);
    let user_id = Uuid::new_v4();
    let failing = QuizResult::new(
        user_id,
        quiz_id,
        QuizScore {
            score_percent: 0,
            passed: false,
            correct: 0,
            total: 1,
        },
        vec![Some(1)],
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    );

    // Act
    let quiz = store.quiz_for_module("l-1a").await.unwrap().unwrap();
    let refs = store
        .quizzes_for_modules(&["l-1a".to_owned(), "l-9".to_owned()])
        .await
        .unwrap();
    store.save_result(&failing).await.unwrap();
    let passed_before = store.has_passing_result(user_id, quiz_id).await.unwrap();
    let passing = QuizResult {
        id: Uuid::new_v4(),
        score_percent: 100,
        passed: true,
        answers: vec![Some(0)],
        ..failing.clone()
    };
    store.save_result(&passing).await.unwrap();
    let passed_after = store.has_passing_result(user_id, quiz_id).await.unwrap();

    // Assert
    assert_eq!(quiz.passing_score, 60);
    assert_eq!(quiz.questions[0].correct_index(), Some(0));
    assert_eq!(quiz.questions[0].points, 1);
    assert_eq!(store.quiz_by_id(quiz_id).await.unwrap(), Some(quiz));
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].quiz_id, quiz_id);
    assert!(!passed_before);
    assert!(passed_after);
}
