//! Integration tests for the player session
//!
//! This test suite verifies:
//! - Loading tracks from a catalog into the view state and playlist
//! - Intent dispatch through the full stack
//! - Event aggregation into the view state
//! - Release semantics

use async_trait::async_trait;
use bridge_traits::{EngineCommand, MediaEngine, MemoryEngine};
use core_library::catalog::sample_tracks;
use core_library::{InMemoryCatalog, LibraryError, Track, TrackCatalog};
use core_playback::MediaPlayer;
use core_runtime::config::PlayerConfig;
use core_service::{PlayerFactory, PlayerIntent, PlayerSession, PlayerViewState, ServiceError};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

mock! {
    pub Catalog {}

    #[async_trait]
    impl TrackCatalog for Catalog {
        async fn get_tracks(&self) -> core_library::Result<Vec<Track>>;
        async fn get_track_by_id(&self, id: &str) -> core_library::Result<Option<Track>>;
        async fn search_tracks(&self, query: &str) -> core_library::Result<Vec<Track>>;
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn session_with(engine: &Arc<MemoryEngine>, config: PlayerConfig) -> PlayerSession {
    PlayerFactory::create_session(
        engine.clone(),
        Arc::new(InMemoryCatalog::with_sample_tracks()),
        config,
    )
    .await
    .unwrap()
}

async fn wait_until<F>(view: &mut watch::Receiver<PlayerViewState>, predicate: F) -> PlayerViewState
where
    F: FnMut(&PlayerViewState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), view.wait_for(predicate))
        .await
        .expect("view state did not settle")
        .expect("session state channel closed")
        .clone()
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_load_tracks_fills_view_and_playlist() {
    let engine = Arc::new(MemoryEngine::new());
    let session = session_with(&engine, PlayerConfig::default()).await;

    session.handle_intent(PlayerIntent::LoadTracks).await;

    let state = session.state();
    assert_eq!(state.tracks, sample_tracks());
    assert!(!state.is_loading);
    assert_eq!(state.error, None);
    assert_eq!(session.stack().playlist().unwrap().tracks(), sample_tracks());
    assert!(engine.loaded_uri().is_none());
}

#[tokio::test]
async fn test_load_tracks_replaces_previous_playlist() {
    let engine = Arc::new(MemoryEngine::new());
    let session = session_with(&engine, PlayerConfig::default()).await;

    session.load_tracks().await.unwrap();
    session.load_tracks().await.unwrap();

    assert_eq!(session.stack().playlist().unwrap().len(), 3);
}

#[tokio::test]
async fn test_auto_play_starts_first_track() {
    let engine = Arc::new(MemoryEngine::new());
    let config = PlayerConfig::builder().auto_play(true).build().unwrap();
    let session = session_with(&engine, config).await;
    let mut view = session.subscribe();
    let first = sample_tracks().remove(0);

    session.handle_intent(PlayerIntent::LoadTracks).await;

    let state = wait_until(&mut view, |s| s.current_track.is_some() && s.is_playing).await;
    assert_eq!(state.current_track, Some(first.clone()));
    assert_eq!(engine.loaded_uri(), Some(first.uri));
    assert_eq!(session.stack().playlist().unwrap().current_index(), Some(0));
}

#[tokio::test]
async fn test_catalog_failure_is_recorded() {
    let mut catalog = MockCatalog::new();
    catalog
        .expect_get_tracks()
        .times(2)
        .returning(|| Err(LibraryError::Unavailable("offline".to_string())));
    let stack = PlayerFactory::create_stack(Arc::new(MemoryEngine::new()), PlayerConfig::default())
        .await
        .unwrap();
    let session = PlayerSession::new(stack, Arc::new(catalog), &PlayerConfig::default());

    session.handle_intent(PlayerIntent::LoadTracks).await;
    let state = session.state();
    assert!(!state.is_loading);
    assert_eq!(state.error.as_deref(), Some("Catalog unavailable: offline"));
    assert!(state.tracks.is_empty());

    let result = session.load_tracks().await;
    assert!(matches!(result, Err(ServiceError::Library(_))));
}

// ============================================================================
// Intents and aggregation
// ============================================================================

#[tokio::test]
async fn test_skip_intents_walk_the_playlist() {
    let engine = Arc::new(MemoryEngine::new());
    let session = session_with(&engine, PlayerConfig::default()).await;
    let mut view = session.subscribe();
    let tracks = sample_tracks();
    session.handle_intent(PlayerIntent::LoadTracks).await;

    session.handle_intent(PlayerIntent::SkipToNext).await;
    session.handle_intent(PlayerIntent::SkipToNext).await;
    let state = wait_until(&mut view, |s| s.current_track.as_ref() == Some(&tracks[1])).await;
    assert!(state.is_playing);

    session.handle_intent(PlayerIntent::SkipToPrevious).await;
    wait_until(&mut view, |s| s.current_track.as_ref() == Some(&tracks[0])).await;
    assert_eq!(engine.loaded_uri(), Some(tracks[0].uri.clone()));
}

#[tokio::test]
async fn test_pause_resume_and_seek() {
    let engine = Arc::new(MemoryEngine::new());
    let session = session_with(&engine, PlayerConfig::default()).await;
    let mut view = session.subscribe();
    let track = sample_tracks().remove(1);

    session.handle_intent(PlayerIntent::PlayTrack(track.clone())).await;
    wait_until(&mut view, |s| s.is_playing).await;

    session.handle_intent(PlayerIntent::PauseTrack).await;
    wait_until(&mut view, |s| !s.is_playing).await;

    session.handle_intent(PlayerIntent::ResumeTrack).await;
    session.handle_intent(PlayerIntent::SeekTo(30_000)).await;
    wait_until(&mut view, |s| s.is_playing).await;

    assert_eq!(engine.position_ms(), 30_000);
    assert!(engine.commands().contains(&EngineCommand::Seek(30_000)));
}

#[tokio::test(start_paused = true)]
async fn test_position_and_duration_reach_the_view() {
    let track = sample_tracks().remove(0);
    let engine = Arc::new(MemoryEngine::new().with_duration(track.uri.clone(), 180_000));
    let session = session_with(&engine, PlayerConfig::default()).await;
    let mut view = session.subscribe();

    session.handle_intent(PlayerIntent::PlayTrack(track)).await;
    engine.advance(1500);

    let state = wait_until(&mut view, |s| s.playback_position == 1500).await;
    assert_eq!(state.duration, 180_000);
}

#[tokio::test]
async fn test_play_failure_reaches_the_view() {
    let engine = Arc::new(MemoryEngine::new());
    let session = session_with(&engine, PlayerConfig::default()).await;
    let mut view = session.subscribe();
    let track = sample_tracks().remove(2);
    engine.reject_uri(track.uri.clone());

    session.handle_intent(PlayerIntent::PlayTrack(track)).await;

    let state = wait_until(&mut view, |s| s.error.is_some()).await;
    assert_eq!(state.error.as_deref(), Some("Failed to play track: Sample Song 3"));
    assert!(!state.is_playing);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_release_is_idempotent_and_final() {
    let engine = Arc::new(MemoryEngine::new());
    let session = session_with(&engine, PlayerConfig::default()).await;

    session.release().await;
    session.release().await;

    let releases = engine
        .commands()
        .into_iter()
        .filter(|c| *c == EngineCommand::Release)
        .count();
    assert_eq!(releases, 1);
    assert!(session.is_released());

    session.handle_intent(PlayerIntent::LoadTracks).await;
    assert!(session.state().tracks.is_empty());
    assert!(matches!(session.load_tracks().await, Err(ServiceError::Released)));
}
