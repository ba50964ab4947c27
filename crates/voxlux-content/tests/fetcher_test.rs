//! Tests for the remote override fetcher's fallback behaviour.

use std::sync::Arc;

use voxlux_content::application::fetcher::RemoteOverrideFetcher;
use voxlux_test_support::{FailingCourseStore, InMemoryCourseStore, sample_course};

#[tokio::test]
async fn test_fetch_world_returns_mastermind_by_position() {
    // Arrange
    let store = InMemoryCourseStore::new(vec![sample_course("storytelling", 3, 3)]);
    let fetcher = RemoteOverrideFetcher::new(Arc::new(store));

    // Act
    let world = fetcher.fetch_world("storytelling", 2).await;

    // Assert
    let world = world.unwrap();
    assert_eq!(world.id, "storytelling-mm-2");
    assert_eq!(world.lessons.len(), 3);
}

#[tokio::test]
async fn test_fetch_world_out_of_range_is_none() {
    let store = InMemoryCourseStore::new(vec![sample_course("storytelling", 3, 3)]);
    let fetcher = RemoteOverrideFetcher::new(Arc::new(store));

    assert!(fetcher.fetch_world("storytelling", 4).await.is_none());
    assert!(fetcher.fetch_world("storytelling", 0).await.is_none());
}

#[tokio::test]
async fn test_unknown_course_is_none() {
    let fetcher = RemoteOverrideFetcher::new(Arc::new(InMemoryCourseStore::default()));

    assert!(fetcher.fetch_course("podcast").await.is_none());
}

#[tokio::test]
async fn test_backend_failure_falls_back_silently() {
    let fetcher = RemoteOverrideFetcher::new(Arc::new(FailingCourseStore));

    assert!(fetcher.fetch_course("storytelling").await.is_none());
    assert!(fetcher.fetch_world("storytelling", 1).await.is_none());
}
