//! Tests for the quiz application service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use uuid::Uuid;
use voxlux_core::error::DomainError;
use voxlux_quiz::application::service::QuizService;
use voxlux_quiz::domain::attempt::QuizAttempt;
use voxlux_test_support::{FailingQuizStore, FixedClock, InMemoryQuizStore, sample_quiz};

fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()))
}

#[tokio::test]
async fn test_load_quiz_returns_none_for_module_without_quiz() {
    let service = QuizService::new(Arc::new(InMemoryQuizStore::default()), clock());

    let quiz = service.load_quiz("podcast-01-signal").await.unwrap();

    assert!(quiz.is_none());
}

#[tokio::test]
async fn test_load_quiz_treats_invalid_quiz_as_absent() {
    // Arrange
    let mut broken = sample_quiz("podcast-01-signal", 2, 50);
    broken.questions[0].options[1].correct = true;
    let service = QuizService::new(Arc::new(InMemoryQuizStore::new(vec![broken])), clock());

    // Act
    let quiz = service.load_quiz("podcast-01-signal").await.unwrap();

    // Assert
    assert!(quiz.is_none());
}

#[tokio::test]
async fn test_load_quiz_surfaces_store_failure() {
    let service = QuizService::new(Arc::new(FailingQuizStore), clock());

    let result = service.load_quiz("podcast-01-signal").await;

    assert!(matches!(result, Err(DomainError::Infrastructure(_))));
}

#[tokio::test]
async fn test_submit_attempt_persists_result() {
    // Arrange
    let store = Arc::new(InMemoryQuizStore::new(vec![sample_quiz("m-1", 4, 75)]));
    let service = QuizService::new(store.clone(), clock());
    let quiz = service.load_quiz("m-1").await.unwrap().unwrap();
    let quiz_id = quiz.id;
    let user_id = Uuid::new_v4();
    let mut attempt = QuizAttempt::new(quiz);
    for (question, option) in [0, 0, 0, 1].into_iter().enumerate() {
        attempt.select_for(question, option).unwrap();
    }

    // Act
    let outcome = service.submit_attempt(user_id, &mut attempt).await.unwrap();

    // Assert
    assert_eq!(outcome.score.score_percent, 75);
    assert!(outcome.score.passed);
    assert!(outcome.saved);
    let results = store.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].user_id, user_id);
    assert_eq!(results[0].quiz_id, quiz_id);
    assert_eq!(results[0].answers, vec![Some(0), Some(0), Some(0), Some(1)]);
    assert_eq!(
        results[0].submitted_at,
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_save_failure_does_not_hide_score() {
    // Arrange
    let quiz = sample_quiz("m-1", 2, 50);
    let store = Arc::new(InMemoryQuizStore::with_failing_saves(vec![quiz.clone()]));
    let service = QuizService::new(store.clone(), clock());
    let mut attempt = QuizAttempt::new(quiz);
    attempt.select(0).unwrap();

    // Act
    let outcome = service
        .submit_attempt(Uuid::new_v4(), &mut attempt)
        .await
        .unwrap();

    // Assert
    assert_eq!(outcome.score.score_percent, 50);
    assert!(outcome.score.passed);
    assert!(!outcome.saved);
    assert!(store.results().is_empty());
}

#[tokio::test]
async fn test_submit_answers_scores_full_sheet() {
    let quiz = sample_quiz("m-1", 10, 80);
    let quiz_id = quiz.id;
    let service = QuizService::new(Arc::new(InMemoryQuizStore::new(vec![quiz])), clock());
    let answers: Vec<Option<usize>> = (0..10)
        .map(|i| if i < 7 { Some(0) } else { Some(1) })
        .collect();

    let outcome = service
        .submit_answers(Uuid::new_v4(), quiz_id, &answers)
        .await
        .unwrap();

    assert_eq!(outcome.score.score_percent, 70);
    assert!(!outcome.score.passed);
}

#[tokio::test]
async fn test_submit_answers_rejects_wrong_length_and_unknown_quiz() {
    let quiz = sample_quiz("m-1", 3, 50);
    let quiz_id = quiz.id;
    let service = QuizService::new(Arc::new(InMemoryQuizStore::new(vec![quiz])), clock());

    let short = service
        .submit_answers(Uuid::new_v4(), quiz_id, &[Some(0)])
        .await;
    let unknown = service
        .submit_answers(Uuid::new_v4(), Uuid::new_v4(), &[])
        .await;

    assert!(matches!(short, Err(DomainError::Validation(_))));
    assert!(matches!(unknown, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn test_quiz_for_world_finds_quiz_among_module_ids() {
    let quiz = sample_quiz("m-2", 1, 50);
    let quiz_id = quiz.id;
    let service = QuizService::new(Arc::new(InMemoryQuizStore::new(vec![quiz])), clock());

    let found = service
        .quiz_for_world(&["m-1".to_owned(), "m-2".to_owned()])
        .await
        .unwrap();
    let missing = service.quiz_for_world(&["m-3".to_owned()]).await.unwrap();

    assert_eq!(found.unwrap().quiz_id, quiz_id);
    assert!(missing.is_none());
}
