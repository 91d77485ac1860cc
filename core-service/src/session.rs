//! # Player Session
//!
//! Presentation-side façade over a [`PlayerStack`].
//!
//! ## Overview
//!
//! A [`PlayerSession`] owns three things:
//! - the stack it dispatches [`PlayerIntent`]s to
//! - the [`TrackCatalog`] that `LoadTracks` reads from
//! - a [`PlayerViewState`] published on a `watch` channel
//!
//! One aggregation task folds the stack's [`PlayerEvent`]s into the view
//! state. It stops when the session is released or dropped, or when the
//! stack's event bus closes.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bridge_traits::MemoryEngine;
//! use core_library::InMemoryCatalog;
//! use core_runtime::config::PlayerConfig;
//! use core_service::{PlayerFactory, PlayerIntent};
//! use std::sync::Arc;
//!
//! # async fn example() -> core_service::Result<()> {
//! let session = PlayerFactory::create_session(
//!     Arc::new(MemoryEngine::new()),
//!     Arc::new(InMemoryCatalog::with_sample_tracks()),
//!     PlayerConfig::default(),
//! )
//! .await?;
//!
//! let mut view = session.subscribe();
//! session.handle_intent(PlayerIntent::LoadTracks).await;
//! session.handle_intent(PlayerIntent::SkipToNext).await;
//! view.changed().await.ok();
//! println!("now playing: {:?}", view.borrow().current_track);
//!
//! session.release().await;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, ServiceError};
use core_async::sync::{watch, CancellationToken, DropGuard};
use core_async::task;
use core_library::{Track, TrackCatalog};
use core_playback::{MediaPlayer, PlayerEvent, PlayerEventStream, PlayerStack};
use core_runtime::config::PlayerConfig;
use core_runtime::events::RecvError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a UI needs to render the player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerViewState {
    /// Tracks from the last successful `LoadTracks`.
    pub tracks: Vec<Track>,
    pub current_track: Option<Track>,
    pub is_playing: bool,
    /// Milliseconds.
    pub playback_position: u64,
    /// Milliseconds, 0 while unknown.
    pub duration: u64,
    pub is_loading: bool,
    /// Last reported failure.
    pub error: Option<String>,
}

impl PlayerViewState {
    /// Fold one player event into the state.
    ///
    /// Returns `false` when the event leaves the state untouched.
    pub fn apply(&mut self, event: &PlayerEvent) -> bool {
        match event {
            PlayerEvent::TrackChanged(track) => {
                self.current_track = track.clone();
                if track.is_none() {
                    self.playback_position = 0;
                    self.duration = 0;
                }
            }
            PlayerEvent::IsPlayingChanged(playing) => self.is_playing = *playing,
            PlayerEvent::PositionChanged(position) => self.playback_position = *position,
            PlayerEvent::DurationChanged(duration) => self.duration = *duration,
            PlayerEvent::Error { message, .. } => self.error = Some(message.clone()),
            PlayerEvent::PlaybackStateChanged(_) => return false,
        }
        true
    }
}

/// User actions a session understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PlayerIntent {
    LoadTracks,
    PlayTrack(Track),
    PauseTrack,
    ResumeTrack,
    SkipToNext,
    SkipToPrevious,
    /// Position in milliseconds.
    SeekTo(u64),
}

/// Dispatches intents to a [`PlayerStack`] and publishes a [`PlayerViewState`].
pub struct PlayerSession {
    stack: PlayerStack,
    catalog: Arc<dyn TrackCatalog>,
    state: Arc<watch::Sender<PlayerViewState>>,
    auto_play: bool,
    aggregator: Mutex<Option<DropGuard>>,
    released: AtomicBool,
}

impl PlayerSession {
    /// Create a session and start folding the stack's events.
    ///
    /// Must be called from within a runtime context.
    pub fn new(stack: PlayerStack, catalog: Arc<dyn TrackCatalog>, config: &PlayerConfig) -> Self {
        let state = Arc::new(watch::Sender::new(PlayerViewState::default()));
        let token = CancellationToken::new();
        task::spawn(aggregate(stack.subscribe(), Arc::clone(&state), token.clone()));
        info!(auto_play = config.auto_play, "Player session started");

        Self {
            stack,
            catalog,
            state,
            auto_play: config.auto_play,
            aggregator: Mutex::new(Some(token.drop_guard())),
            released: AtomicBool::new(false),
        }
    }

    pub fn stack(&self) -> &PlayerStack {
        &self.stack
    }

    /// Current view state.
    pub fn state(&self) -> PlayerViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlayerViewState> {
        self.state.subscribe()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// Dispatch one intent.
    ///
    /// Failures never propagate: they land in [`PlayerViewState::error`].
    pub async fn handle_intent(&self, intent: PlayerIntent) {
        if self.is_released() {
            debug!(?intent, "Intent ignored on released session");
            return;
        }

        match intent {
            PlayerIntent::LoadTracks => {
                if let Err(err) = self.load_tracks().await {
                    warn!(error = %err, "Failed to load tracks");
                }
            }
            PlayerIntent::PlayTrack(track) => self.stack.play_track(track).await,
            PlayerIntent::PauseTrack => self.stack.pause().await,
            PlayerIntent::ResumeTrack => self.stack.resume().await,
            PlayerIntent::SkipToNext => self.skip(true).await,
            PlayerIntent::SkipToPrevious => self.skip(false).await,
            PlayerIntent::SeekTo(position_ms) => self.stack.seek_to(position_ms).await,
        }
    }

    /// Load every catalog track into the view state and the playlist.
    ///
    /// With `auto_play` set, the first track starts playing.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Released`] after [`PlayerSession::release`]
    /// and [`ServiceError::Library`] when the catalog fails. The failure is
    /// also recorded in the view state.
    pub async fn load_tracks(&self) -> Result<Vec<Track>> {
        if self.is_released() {
            return Err(ServiceError::Released);
        }

        self.state.send_modify(|state| state.is_loading = true);
        let tracks = match self.catalog.get_tracks().await {
            Ok(tracks) => tracks,
            Err(err) => {
                let message = err.to_string();
                self.state.send_modify(|state| {
                    state.is_loading = false;
                    state.error = Some(message);
                });
                return Err(err.into());
            }
        };

        if let Some(playlist) = self.stack.playlist() {
            playlist.clear();
            playlist.add_tracks(tracks.clone(), None);
        }
        self.state.send_modify(|state| {
            state.tracks = tracks.clone();
            state.is_loading = false;
            state.error = None;
        });
        info!(count = tracks.len(), "Tracks loaded");

        if self.auto_play {
            if let Some(first) = tracks.first() {
                self.stack.play_track(first.clone()).await;
            }
        }
        Ok(tracks)
    }

    /// Without a playlist layer, skipping falls back to the player's own
    /// queue.
    async fn skip(&self, forward: bool) {
        if self.stack.playlist().is_none() {
            if forward {
                self.stack.skip_to_next().await;
            } else {
                self.stack.skip_to_previous().await;
            }
            return;
        }

        let played = if forward {
            self.stack.play_next().await
        } else {
            self.stack.play_previous().await
        };
        if played.is_none() {
            debug!(forward, "Nothing to skip to");
        }
    }

    /// Stop event aggregation and release the stack. Idempotent.
    pub async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.aggregator.lock().take();
        self.stack.release().await;
        info!("Player session released");
    }
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("stack", &self.stack)
            .field("auto_play", &self.auto_play)
            .field("released", &self.is_released())
            .finish()
    }
}

async fn aggregate(
    mut events: PlayerEventStream,
    state: Arc<watch::Sender<PlayerViewState>>,
    token: CancellationToken,
) {
    while let Some(received) = token.run_until_cancelled(events.recv()).await {
        match received {
            Ok(event) => {
                state.send_if_modified(|state| state.apply(&event));
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Session fell behind the player event stream");
            }
            Err(RecvError::Closed) => break,
        }
    }
    debug!("Session event aggregation stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track::new(id, format!("Song {id}"), "Artist", "Album", 1000, format!("mem://{id}"))
    }

    #[test]
    fn test_apply_folds_events() {
        let mut state = PlayerViewState::default();

        assert!(state.apply(&PlayerEvent::TrackChanged(Some(track("1")))));
        assert!(state.apply(&PlayerEvent::IsPlayingChanged(true)));
        assert!(state.apply(&PlayerEvent::PositionChanged(1200)));
        assert!(state.apply(&PlayerEvent::DurationChanged(3000)));

        assert_eq!(state.current_track, Some(track("1")));
        assert!(state.is_playing);
        assert_eq!(state.playback_position, 1200);
        assert_eq!(state.duration, 3000);
        assert_eq!(state.error, None);
    }

    #[test]
    fn test_apply_stop_resets_progress() {
        let mut state = PlayerViewState {
            current_track: Some(track("1")),
            playback_position: 500,
            duration: 1000,
            ..PlayerViewState::default()
        };

        state.apply(&PlayerEvent::TrackChanged(None));

        assert_eq!(state.current_track, None);
        assert_eq!(state.playback_position, 0);
        assert_eq!(state.duration, 0);
    }

    #[test]
    fn test_apply_records_error_message() {
        let mut state = PlayerViewState::default();

        state.apply(&PlayerEvent::error("Failed to play track: Song 1", Some("404".into())));

        assert_eq!(state.error.as_deref(), Some("Failed to play track: Song 1"));
    }

    #[test]
    fn test_apply_ignores_state_changes() {
        let mut state = PlayerViewState::default();
        assert!(!state.apply(&PlayerEvent::PlaybackStateChanged(
            core_playback::PlaybackState::Playing
        )));
        assert_eq!(state, PlayerViewState::default());
    }

    #[test]
    fn test_intent_serialization() {
        let json = serde_json::to_string(&PlayerIntent::SeekTo(42)).unwrap();
        assert_eq!(json, r#"{"type":"seek_to","payload":42}"#);
    }
}
