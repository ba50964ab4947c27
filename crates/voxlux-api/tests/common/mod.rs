//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use voxlux_api::state::{AppState, Backends};
use voxlux_content::domain::course::Course;
use voxlux_content::domain::track::TrackMap;
use voxlux_content::registry::ContentRegistry;
use voxlux_core::clock::Clock;
use voxlux_core::flags::FlagService;
use voxlux_quiz::domain::quiz::Quiz;
use voxlux_test_support::{
    FixedClock, InMemoryCourseStore, InMemoryEventRepository, InMemoryFlagBackend,
    InMemoryQuizStore,
};
use voxlux_world::view::WorldViewConfig;

fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::standard())
}

/// In-memory backends a test can seed and inspect.
pub struct TestBackends {
    pub events: Arc<InMemoryEventRepository>,
    pub courses: Vec<Course>,
    pub quizzes: Arc<InMemoryQuizStore>,
    pub flags: Arc<InMemoryFlagBackend>,
}

impl Default for TestBackends {
    fn default() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepository::default()),
            courses: Vec::new(),
            quizzes: Arc::new(InMemoryQuizStore::default()),
            flags: Arc::new(InMemoryFlagBackend::default()),
        }
    }
}

impl TestBackends {
    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            courses,
            ..Self::default()
        }
    }

    pub fn with_quizzes(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: Arc::new(InMemoryQuizStore::new(quizzes)),
            ..Self::default()
        }
    }
}

/// Build the full app router over in-memory stores. World views use a
/// zero intro delay, so a mounted view reaches its first slot as soon as
/// the runtime gets a turn (see [`settle`]).
pub async fn build_test_app(backends: &TestBackends) -> Router {
    voxlux_api::app(build_test_state(backends).await)
}

/// Build the application state behind [`build_test_app`], for tests that
/// drive the session registry directly.
pub async fn build_test_state(backends: &TestBackends) -> AppState {
    let flags = Arc::new(FlagService::init(backends.flags.clone()).await);
    AppState::new(
        Backends {
            clock: fixed_clock(),
            events: backends.events.clone(),
            courses: Arc::new(InMemoryCourseStore::new(backends.courses.clone())),
            quizzes: backends.quizzes.clone(),
        },
        Arc::new(ContentRegistry::builtin().unwrap()),
        TrackMap::default(),
        flags,
        WorldViewConfig {
            intro_delay: Duration::ZERO,
        },
    )
}

/// Lets background view tasks (intro timer, override fetch) run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections answer in plain text.
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&body_bytes).into_owned())
        })
    };

    (status, json)
}

fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, json_request("POST", uri, body)).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: &Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, json_request("PUT", uri, body)).await
}

/// Send a bodiless POST request and return the response.
pub async fn post_empty(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, empty_request("POST", uri)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, empty_request("GET", uri)).await
}

/// Send a DELETE request and return the response.
pub async fn delete(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, empty_request("DELETE", uri)).await
}
