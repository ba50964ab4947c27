//! Integration tests for the diploma gate.

mod common;

use axum::http::StatusCode;
use uuid::Uuid;
use voxlux_test_support::sample_course;

#[tokio::test]
async fn test_diploma_follows_lesson_completion() {
    // Arrange
    let backends = common::TestBackends::with_courses(vec![sample_course("workshop", 1, 2)]);
    let app = common::build_test_app(&backends).await;
    let user_id = Uuid::new_v4();
    let diploma = format!("/api/v1/courses/workshop/diploma?user_id={user_id}");
    let complete = format!("/api/v1/progress/{user_id}/complete");

    // Act
    common::post_json(
        &app,
        &complete,
        &serde_json::json!({ "module_ids": ["workshop-w1-l0"] }),
    )
    .await;
    let (status, halfway) = common::get_json(&app, &diploma).await;
    common::post_json(
        &app,
        &complete,
        &serde_json::json!({ "module_ids": ["workshop-w1-l1"] }),
    )
    .await;
    let (_, done) = common::get_json(&app, &diploma).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(halfway["eligible"], false);
    assert_eq!(halfway["progress_percent"], 50);
    assert_eq!(done["eligible"], true);
    assert_eq!(done["progress_percent"], 100);
    assert_eq!(done["degraded"], false);
}

#[tokio::test]
async fn test_static_storytelling_course_earns_a_diploma() {
    // Arrange
    let app = common::build_test_app(&common::TestBackends::default()).await;
    let user_id = Uuid::new_v4();
    let module_ids: Vec<String> = [
        "origin", "hero", "threshold", "mentor", "trials", "abyss", "reward", "return",
        "resurrection", "elixir",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| format!("storytelling-{:02}-{name}", i + 1))
    .collect();

    // Act
    common::post_json(
        &app,
        &format!("/api/v1/progress/{user_id}/complete"),
        &serde_json::json!({ "module_ids": module_ids }),
    )
    .await;
    let (status, json) = common::get_json(
        &app,
        &format!("/api/v1/courses/storytelling/diploma?user_id={user_id}"),
    )
    .await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["eligible"], true);
    assert_eq!(json["progress_percent"], 100);
}

#[tokio::test]
async fn test_unknown_course_is_not_eligible() {
    let app = common::build_test_app(&common::TestBackends::default()).await;

    let (status, json) = common::get_json(
        &app,
        &format!("/api/v1/courses/marketing-101/diploma?user_id={}", Uuid::new_v4()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["eligible"], false);
}

#[tokio::test]
async fn test_diploma_requires_a_user() {
    let app = common::build_test_app(&common::TestBackends::default()).await;

    let (status, _) = common::get_json(&app, "/api/v1/courses/podcast/diploma").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
