//! # Engine Player
//!
//! [`EnginePlayer`] is the base backend adapter: it drives a
//! [`MediaEngine`] and turns the engine's callbacks into [`PlayerEvent`]s.
//!
//! ## Event flow
//!
//! ```text
//!  MediaEngine ──callbacks──> EngineBridge ──emit──┐
//!                                                  ├──> PlayerEventBus ──> subscribers
//!  position ticker ──PositionChanged──────────────┘
//! ```
//!
//! Callbacks are translated synchronously and never block: the bus drops the
//! oldest events for a subscriber that falls behind.
//!
//! ## Lifecycle
//!
//! The position ticker starts after the first successful `play_track` or
//! `set_playlist` and stops on `stop()`. `release()` runs teardown exactly
//! once: stop the ticker, detach the listener, release the engine, close the
//! bus.

use crate::events::{PlayerEvent, PlayerEventBus, PlayerEventStream, UNKNOWN_ERROR_MESSAGE};
use crate::player::{clamp_speed, clamp_volume, MediaPlayer};
use crate::state::PlaybackState;
use async_trait::async_trait;
use bridge_traits::error::BridgeError;
use bridge_traits::{EngineFault, EngineListener, MediaEngine, TransportState};
use core_async::sync::{CancellationToken, DropGuard};
use core_async::task;
use core_library::Track;
use core_runtime::config::PlayerConfig;
use core_runtime::logging::redact_uri;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

/// Tracks handed to the engine with `set_playlist`.
#[derive(Debug, Default)]
struct EngineQueue {
    tracks: Vec<Track>,
    index: Option<usize>,
}

/// State shared between the player and the engine callbacks.
struct PlayerShared {
    id: Uuid,
    events: PlayerEventBus,
    current_track: RwLock<Option<Track>>,
    queue: Mutex<EngineQueue>,
    failed: AtomicBool,
    paused: AtomicBool,
}

impl PlayerShared {
    fn emit(&self, event: PlayerEvent) {
        trace!(player_id = %self.id, event = event.kind(), "Emitting player event");
        // No subscribers or a closed bus is not an error for the producer.
        let _ = self.events.emit(event);
    }

    fn set_current(&self, track: Option<Track>) {
        *self.current_track.write() = track.clone();
        self.emit(PlayerEvent::TrackChanged(track));
    }
}

/// Engine listener translating callbacks into player events.
struct EngineBridge {
    shared: Arc<PlayerShared>,
    engine: Weak<dyn MediaEngine>,
}

impl EngineListener for EngineBridge {
    fn on_transport_state_changed(&self, state: TransportState) {
        match state {
            TransportState::Error => self.shared.failed.store(true, Ordering::SeqCst),
            TransportState::Ready => self.shared.failed.store(false, Ordering::SeqCst),
            _ => {}
        }

        self.shared
            .emit(PlayerEvent::PlaybackStateChanged(PlaybackState::from_transport(state)));

        if state == TransportState::Ready {
            if let Some(engine) = self.engine.upgrade() {
                let duration = engine.duration();
                if duration.is_known() {
                    self.shared
                        .emit(PlayerEvent::DurationChanged(duration.millis_or_zero()));
                }
            }
        }
    }

    fn on_is_playing_changed(&self, is_playing: bool) {
        if is_playing {
            self.shared.paused.store(false, Ordering::SeqCst);
        }
        self.shared.emit(PlayerEvent::IsPlayingChanged(is_playing));
    }

    fn on_error(&self, fault: EngineFault) {
        self.shared.failed.store(true, Ordering::SeqCst);
        let message = fault
            .message
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
        warn!(player_id = %self.shared.id, reason = %message, cause = ?fault.cause, "Engine reported an error");
        self.shared.emit(PlayerEvent::Error {
            message,
            cause: fault.cause,
        });
    }

    fn on_track_boundary(&self, queue_index: usize) {
        let track = {
            let mut queue = self.shared.queue.lock();
            let track = queue.tracks.get(queue_index).cloned();
            if track.is_some() {
                queue.index = Some(queue_index);
            }
            track
        };
        match track {
            Some(track) => {
                debug!(player_id = %self.shared.id, queue_index, track_id = %track.id, "Engine advanced to next item");
                self.shared.set_current(Some(track));
            }
            None => debug!(player_id = %self.shared.id, queue_index, "Track boundary outside known queue"),
        }
    }
}

/// Player backed by a [`MediaEngine`].
pub struct EnginePlayer {
    engine: Arc<dyn MediaEngine>,
    shared: Arc<PlayerShared>,
    config: PlayerConfig,
    ticker: Mutex<Option<DropGuard>>,
    released: AtomicBool,
}

impl EnginePlayer {
    /// Wrap `engine`, register for its callbacks and apply the configured
    /// volume and speed.
    pub async fn new(engine: Arc<dyn MediaEngine>, config: PlayerConfig) -> Self {
        let shared = Arc::new(PlayerShared {
            id: Uuid::new_v4(),
            events: PlayerEventBus::new(config.event_buffer_capacity),
            current_track: RwLock::new(None),
            queue: Mutex::new(EngineQueue::default()),
            failed: AtomicBool::new(false),
            paused: AtomicBool::new(false),
        });

        engine.set_listener(Some(Arc::new(EngineBridge {
            shared: Arc::clone(&shared),
            engine: Arc::downgrade(&engine),
        })));

        let player = Self {
            engine,
            shared,
            config,
            ticker: Mutex::new(None),
            released: AtomicBool::new(false),
        };

        if let Err(err) = player
            .engine
            .set_volume(clamp_volume(player.config.default_volume))
            .await
        {
            warn!(player_id = %player.id(), error = %err, "Failed to apply default volume");
        }
        if let Err(err) = player
            .engine
            .set_speed(clamp_speed(player.config.default_speed))
            .await
        {
            warn!(player_id = %player.id(), error = %err, "Failed to apply default speed");
        }

        info!(player_id = %player.id(), "Engine player created");
        player
    }

    /// Instance id used in log fields.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    fn fail(&self, message: String, err: BridgeError) {
        self.shared.failed.store(true, Ordering::SeqCst);
        warn!(player_id = %self.id(), reason = %message, error = %err, "Playback command failed");
        self.shared
            .emit(PlayerEvent::error(message, Some(err.to_string())));
    }

    fn report(&self, message: &str, result: bridge_traits::error::Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(player_id = %self.id(), reason = message, error = %err, "Engine command failed");
                self.shared
                    .emit(PlayerEvent::error(message, Some(err.to_string())));
                false
            }
        }
    }

    fn start_ticker(&self) {
        let mut slot = self.ticker.lock();
        if slot.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let engine = Arc::downgrade(&self.engine);
        let shared = Arc::downgrade(&self.shared);
        task::spawn_periodic(
            self.config.position_poll_interval,
            token.clone(),
            move || {
                let (Some(engine), Some(shared)) = (engine.upgrade(), shared.upgrade()) else {
                    return;
                };
                if engine.is_playing() {
                    shared.emit(PlayerEvent::PositionChanged(engine.position_ms()));
                }
            },
        );
        *slot = Some(token.drop_guard());
        debug!(player_id = %self.id(), "Position ticker started");
    }

    fn stop_ticker(&self) {
        if self.ticker.lock().take().is_some() {
            debug!(player_id = %self.id(), "Position ticker stopped");
        }
    }
}

#[async_trait]
impl MediaPlayer for EnginePlayer {
    fn playback_state(&self) -> PlaybackState {
        if self.is_released() {
            return PlaybackState::Idle;
        }
        if self.shared.failed.load(Ordering::SeqCst) {
            return PlaybackState::Error;
        }
        PlaybackState::derive(
            self.engine.transport_state(),
            self.engine.is_playing(),
            self.shared.paused.load(Ordering::SeqCst),
        )
    }

    fn current_position(&self) -> u64 {
        if self.is_released() {
            return 0;
        }
        self.engine.position_ms()
    }

    fn duration(&self) -> u64 {
        if self.is_released() {
            return 0;
        }
        self.engine.duration().millis_or_zero()
    }

    fn is_playing(&self) -> bool {
        !self.is_released() && self.engine.is_playing()
    }

    fn current_track(&self) -> Option<Track> {
        self.shared.current_track.read().clone()
    }

    fn subscribe(&self) -> PlayerEventStream {
        self.shared.events.subscribe()
    }

    async fn play_track(&self, track: Track) {
        if self.is_released() {
            debug!(player_id = %self.id(), "play_track ignored on released player");
            return;
        }

        debug!(player_id = %self.id(), track_id = %track.id, uri = %redact_uri(&track.uri), "Playing track");
        *self.shared.queue.lock() = EngineQueue::default();
        self.shared.paused.store(false, Ordering::SeqCst);
        *self.shared.current_track.write() = Some(track.clone());

        match self.engine.load_and_play(&track.uri).await {
            Ok(()) => {
                self.shared.failed.store(false, Ordering::SeqCst);
                self.shared.emit(PlayerEvent::TrackChanged(Some(track)));
                self.start_ticker();
            }
            Err(err) => self.fail(format!("Failed to play track: {}", track.title), err),
        }
    }

    async fn pause(&self) {
        if self.is_released() {
            return;
        }
        if self.report("Failed to pause playback", self.engine.pause().await) {
            self.shared.paused.store(true, Ordering::SeqCst);
        }
    }

    async fn resume(&self) {
        if self.is_released() {
            return;
        }
        if self.report("Failed to resume playback", self.engine.resume().await) {
            self.shared.paused.store(false, Ordering::SeqCst);
        }
    }

    async fn stop(&self) {
        if self.is_released() {
            return;
        }
        self.stop_ticker();
        self.report("Failed to stop playback", self.engine.stop().await);

        *self.shared.queue.lock() = EngineQueue::default();
        self.shared.paused.store(false, Ordering::SeqCst);
        self.shared.failed.store(false, Ordering::SeqCst);
        self.shared.set_current(None);
    }

    async fn seek_to(&self, position_ms: u64) {
        if self.is_released() {
            return;
        }
        self.report("Failed to seek", self.engine.seek(position_ms).await);
    }

    async fn set_volume(&self, volume: f32) {
        if self.is_released() {
            return;
        }
        let volume = clamp_volume(volume);
        self.report("Failed to set volume", self.engine.set_volume(volume).await);
    }

    async fn set_playback_speed(&self, speed: f32) {
        if self.is_released() {
            return;
        }
        let speed = clamp_speed(speed);
        self.report("Failed to set playback speed", self.engine.set_speed(speed).await);
    }

    async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }

        self.stop_ticker();
        self.engine.set_listener(None);
        *self.shared.current_track.write() = None;
        *self.shared.queue.lock() = EngineQueue::default();
        if let Err(err) = self.engine.release().await {
            warn!(player_id = %self.id(), error = %err, "Engine release failed");
        }
        self.shared.events.close();
        info!(player_id = %self.id(), "Engine player released");
    }

    async fn set_playlist(&self, tracks: Vec<Track>, start_index: usize) {
        if self.is_released() {
            return;
        }
        let Some(last) = tracks.len().checked_sub(1) else {
            debug!(player_id = %self.id(), "Ignoring empty playlist");
            return;
        };

        let start = start_index.min(last);
        let track = tracks[start].clone();
        let uris = tracks.iter().map(|t| t.uri.clone()).collect();
        debug!(player_id = %self.id(), len = tracks.len(), start, "Loading engine queue");

        *self.shared.queue.lock() = EngineQueue {
            tracks,
            index: Some(start),
        };
        self.shared.paused.store(false, Ordering::SeqCst);
        *self.shared.current_track.write() = Some(track.clone());

        match self.engine.load_queue(uris, start).await {
            Ok(()) => {
                self.shared.failed.store(false, Ordering::SeqCst);
                self.shared.emit(PlayerEvent::TrackChanged(Some(track)));
                self.start_ticker();
            }
            Err(err) => {
                *self.shared.queue.lock() = EngineQueue::default();
                self.fail(format!("Failed to play track: {}", track.title), err);
            }
        }
    }

    async fn skip_to_next(&self) {
        let target = {
            let queue = self.shared.queue.lock();
            queue
                .index
                .map(|i| i + 1)
                .filter(|&next| next < queue.tracks.len())
        };
        if let Some(index) = target {
            self.skip_to(index).await;
        }
    }

    async fn skip_to_previous(&self) {
        let target = {
            let queue = self.shared.queue.lock();
            queue.index.and_then(|i| i.checked_sub(1))
        };
        if let Some(index) = target {
            self.skip_to(index).await;
        }
    }
}

impl EnginePlayer {
    async fn skip_to(&self, index: usize) {
        if self.is_released() {
            return;
        }
        let Some(track) = self.shared.queue.lock().tracks.get(index).cloned() else {
            return;
        };

        match self.engine.seek_to_item(index).await {
            Ok(()) => {
                self.shared.queue.lock().index = Some(index);
                self.shared.paused.store(false, Ordering::SeqCst);
                self.shared.failed.store(false, Ordering::SeqCst);
                self.shared.set_current(Some(track));
            }
            Err(err) => self.fail(format!("Failed to play track: {}", track.title), err),
        }
    }
}

impl std::fmt::Debug for EnginePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnginePlayer")
            .field("id", &self.shared.id)
            .field("released", &self.is_released())
            .field("events", &self.shared.events)
            .finish()
    }
}
