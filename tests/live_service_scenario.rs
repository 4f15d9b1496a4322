//! Integration tests for the live session service over real adapters.
//!
//! Wires `LiveSessionService` to the in-memory store and bus, the JSON deck
//! renderer, and a local file store in a temporary directory.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use live_deck::adapters::live::{InMemoryEventBus, InMemoryLiveSessionStore};
use live_deck::adapters::render::JsonDeckRenderer;
use live_deck::adapters::storage::LocalFileStore;
use live_deck::application::LiveSessionService;
use live_deck::domain::deck::{DeckItem, DeckRequest, LiveSessionRequest};
use live_deck::domain::foundation::Timestamp;
use live_deck::domain::live::{LiveError, LiveEvent};

// =============================================================================
// Test Infrastructure
// =============================================================================

const MAX_IDLE: Duration = Duration::from_secs(7200);

fn service(public_dir: &Path) -> Arc<LiveSessionService> {
    let files = Arc::new(LocalFileStore::new(public_dir, "http://localhost:8080/public"));
    Arc::new(LiveSessionService::new(
        Arc::new(InMemoryLiveSessionStore::new()),
        Arc::new(InMemoryEventBus::default()),
        Arc::new(JsonDeckRenderer::new(files.clone())),
        files,
        MAX_IDLE,
    ))
}

fn request(page: i64) -> LiveSessionRequest {
    LiveSessionRequest {
        deck: DeckRequest {
            date: "2024-05-12".to_string(),
            items: vec![DeckItem {
                id: "song-1".to_string(),
                kind: "SONG".to_string(),
                contents: vec!["Verse one".to_string(), "Chorus".to_string()],
                order: vec![0, 1, 0],
            }],
            hints: false,
            ratio: None,
            font_size: None,
            vertical_align: None,
            format: None,
            contents: false,
        },
        current_page: page,
    }
}

fn artifact_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn presenter_drives_a_follower_from_start_to_delete() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());

    let handle = service.create_session(&request(0), None).await.unwrap();
    let token = handle.token.expose().to_string();
    assert_eq!(artifact_count(dir.path()), 1);

    let mut follower = service.subscribe(&handle.key).await.unwrap();
    match &follower.snapshot {
        LiveEvent::Start { url, current_page } => {
            assert!(url.starts_with("http://localhost:8080/public/"));
            assert!(url.ends_with(".json"));
            assert_eq!(*current_page, 0);
        }
        other => panic!("unexpected snapshot {:?}", other),
    }

    let wrong = service.change_page(&handle.key, 1, "wrong-token").await;
    assert_eq!(wrong, Err(LiveError::InvalidToken));
    assert_eq!(
        service.get_session(&handle.key).await.unwrap().current_page(),
        0
    );

    service.change_page(&handle.key, 1, &token).await.unwrap();
    assert_eq!(
        follower.subscription.recv().await,
        Some(LiveEvent::ChangePage { page: 1 })
    );
    assert_eq!(
        service.get_session(&handle.key).await.unwrap().current_page(),
        1
    );

    service.delete_session(&handle.key, &token).await.unwrap();
    assert_eq!(follower.subscription.recv().await, Some(LiveEvent::Delete));
    assert!(matches!(
        service.get_session(&handle.key).await,
        Err(LiveError::NotFound(_))
    ));
    assert_eq!(artifact_count(dir.path()), 0);
}

#[tokio::test]
async fn rendered_artifact_lays_out_ordered_pages() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());

    let handle = service.create_session(&request(0), None).await.unwrap();
    let session = service.get_session(&handle.key).await.unwrap();

    let raw = std::fs::read(dir.path().join(session.file_name())).unwrap();
    let document: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    let texts: Vec<&str> = document["pages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|page| page["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, ["Verse one", "Chorus", "Verse one"]);
}

#[tokio::test]
async fn update_swaps_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());
    let handle = service.create_session(&request(0), None).await.unwrap();
    let before = service.get_session(&handle.key).await.unwrap();

    let mut follower = service.subscribe(&handle.key).await.unwrap();
    service
        .update_session(&handle.key, &request(2), handle.token.expose(), None)
        .await
        .unwrap();

    let after = service.get_session(&handle.key).await.unwrap();
    assert_ne!(before.file_name(), after.file_name());
    assert!(!dir.path().join(before.file_name()).exists());
    assert!(dir.path().join(after.file_name()).exists());
    assert_eq!(
        follower.subscription.recv().await,
        Some(LiveEvent::Start {
            url: after.url().to_string(),
            current_page: 2,
        })
    );
}

#[tokio::test]
async fn concurrent_presenters_get_distinct_keys() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.create_session(&request(0), None).await })
        })
        .collect();

    let mut keys = HashSet::new();
    for task in tasks {
        let handle = task.await.unwrap().unwrap();
        assert!(keys.insert(handle.key));
    }
    assert_eq!(keys.len(), 100);
}

#[tokio::test]
async fn idle_sweep_ends_abandoned_sessions_only() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());
    let abandoned = service.create_session(&request(0), None).await.unwrap();
    let watched = service.create_session(&request(0), None).await.unwrap();
    let _follower = service.subscribe(&watched.key).await.unwrap();

    let later = Timestamp::now().plus_secs(MAX_IDLE.as_secs() as i64 + 60);
    let removed = service.clean_up_at(later).await.unwrap();

    assert_eq!(removed, 1);
    assert!(matches!(
        service.get_session(&abandoned.key).await,
        Err(LiveError::NotFound(_))
    ));
    assert!(service.get_session(&watched.key).await.is_ok());
    assert_eq!(artifact_count(dir.path()), 1);
}
