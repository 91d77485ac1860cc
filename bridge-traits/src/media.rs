//! Media engine bridge.
//!
//! The engine is the host component that actually decodes and renders audio
//! from a URI. The core never inspects audio data: it issues transport
//! commands, reads a handful of status values and listens for callbacks.
//!
//! ## Callback model
//!
//! Engines notify a single registered [`EngineListener`] from their own
//! notification path (a player thread, a main looper, a GStreamer bus). The
//! listener must return quickly and must never block on the caller's control
//! path.
//!
//! ```text
//! caller ──play/pause/seek──> MediaEngine
//!                                 │
//!                 state/playing/error/boundary callbacks
//!                                 ▼
//!                          EngineListener
//! ```

use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Raw transport state reported by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// Nothing loaded, or stopped.
    Idle,
    /// Source is loading or rebuffering.
    Buffering,
    /// Source is prepared; playback may or may not be running.
    Ready,
    /// Reached the end of the source (or of the engine-side queue).
    Ended,
    /// Engine hit a fatal error for the current source.
    Error,
}

/// Duration as reported by an engine; `Unknown` until the source is prepared
/// or for live streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineDuration {
    #[default]
    Unknown,
    Known(u64),
}

impl EngineDuration {
    /// Milliseconds, with the unknown sentinel mapped to `0`.
    pub fn millis_or_zero(self) -> u64 {
        match self {
            EngineDuration::Unknown => 0,
            EngineDuration::Known(ms) => ms,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, EngineDuration::Known(_))
    }
}

/// Error details delivered through [`EngineListener::on_error`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineFault {
    /// Human-readable message, when the engine provides one.
    pub message: Option<String>,
    /// Lower-level cause (codec, network, HTTP status...).
    pub cause: Option<String>,
}

impl EngineFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }
}

/// Callback sink registered on an engine.
///
/// All methods are invoked on the engine's notification path and must not
/// block.
pub trait EngineListener: Send + Sync {
    /// Transport state transitioned.
    fn on_transport_state_changed(&self, state: TransportState);

    /// The engine started or stopped producing audio.
    fn on_is_playing_changed(&self, is_playing: bool);

    /// The current source failed.
    fn on_error(&self, fault: EngineFault);

    /// The engine advanced on its own to another item of the queue loaded with
    /// [`MediaEngine::load_queue`].
    fn on_track_boundary(&self, queue_index: usize) {
        let _ = queue_index;
    }
}

/// Host media engine.
///
/// Control methods may suspend until the engine acknowledges the command.
/// Status getters must be cheap and non-blocking; the core polls
/// [`position_ms`](MediaEngine::position_ms) about once per second.
///
/// # Errors
///
/// Control methods return [`BridgeError`] when the engine rejects a command.
/// After [`release`](MediaEngine::release) every command should fail with
/// [`BridgeError::Released`] or succeed as a no-op.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Current transport state.
    fn transport_state(&self) -> TransportState;

    /// Whether audio is currently being rendered.
    fn is_playing(&self) -> bool;

    /// Playback position of the current item in milliseconds.
    fn position_ms(&self) -> u64;

    /// Duration of the current item.
    fn duration(&self) -> EngineDuration;

    /// Register (or clear) the callback sink. Replaces any previous listener.
    fn set_listener(&self, listener: Option<Arc<dyn EngineListener>>);

    /// Replace whatever is loaded with `uri`, prepare it and start playback.
    async fn load_and_play(&self, uri: &str) -> Result<()>;

    /// Replace whatever is loaded with an engine-side queue and start playing
    /// `uris[start_index]`.
    async fn load_queue(&self, uris: Vec<String>, start_index: usize) -> Result<()>;

    /// Jump to an item of the loaded queue.
    async fn seek_to_item(&self, queue_index: usize) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    async fn resume(&self) -> Result<()>;

    /// Stop playback and unload the current source.
    async fn stop(&self) -> Result<()>;

    async fn seek(&self, position_ms: u64) -> Result<()>;

    /// Output volume in `[0.0, 1.0]`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Playback rate multiplier.
    async fn set_speed(&self, speed: f32) -> Result<()>;

    /// Free native resources. Called at most once by the core.
    async fn release(&self) -> Result<()>;
}

// ============================================================================
// In-memory engine
// ============================================================================

/// Command received by a [`MemoryEngine`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    LoadAndPlay(String),
    LoadQueue(Vec<String>, usize),
    SeekToItem(usize),
    Pause,
    Resume,
    Stop,
    Seek(u64),
    SetVolume(f32),
    SetSpeed(f32),
    Release,
}

#[derive(Default)]
struct MemoryEngineState {
    transport: Option<TransportState>,
    is_playing: bool,
    position_ms: u64,
    loaded_uri: Option<String>,
    queue: Vec<String>,
    queue_index: Option<usize>,
    volume: f32,
    speed: f32,
    released: bool,
    commands: Vec<EngineCommand>,
}

/// Engine that plays nothing but models transport transitions faithfully.
///
/// Useful for development and tests: it records every command, fires the same
/// callbacks a real engine would (buffering → ready → playing), and lets the
/// caller inject failures or simulate the end of an item.
pub struct MemoryEngine {
    state: Mutex<MemoryEngineState>,
    listener: RwLock<Option<Arc<dyn EngineListener>>>,
    durations: RwLock<HashMap<String, u64>>,
    rejected: RwLock<HashSet<String>>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryEngineState {
                volume: 1.0,
                speed: 1.0,
                ..Default::default()
            }),
            listener: RwLock::new(None),
            durations: RwLock::new(HashMap::new()),
            rejected: RwLock::new(HashSet::new()),
        }
    }

    /// Report `duration_ms` once `uri` is prepared. Unregistered URIs report
    /// [`EngineDuration::Unknown`].
    pub fn with_duration(self, uri: impl Into<String>, duration_ms: u64) -> Self {
        self.durations.write().insert(uri.into(), duration_ms);
        self
    }

    /// Make `load_and_play`/`load_queue` fail for `uri`.
    pub fn reject_uri(&self, uri: impl Into<String>) {
        self.rejected.write().insert(uri.into());
    }

    /// Commands received so far.
    pub fn commands(&self) -> Vec<EngineCommand> {
        self.state.lock().commands.clone()
    }

    pub fn loaded_uri(&self) -> Option<String> {
        self.state.lock().loaded_uri.clone()
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn speed(&self) -> f32 {
        self.state.lock().speed
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    pub fn has_listener(&self) -> bool {
        self.listener.read().is_some()
    }

    /// Move the playhead forward as if `millis` of audio had been rendered.
    pub fn advance(&self, millis: u64) {
        let mut state = self.state.lock();
        if state.is_playing {
            state.position_ms += millis;
        }
    }

    /// Simulate the current item finishing. Advances through the queue when a
    /// next item exists, otherwise transitions to `Ended`.
    pub fn finish_current(&self) {
        let next = {
            let mut state = self.state.lock();
            if state.released {
                return;
            }
            match state.queue_index {
                Some(index) if index + 1 < state.queue.len() => {
                    let next = index + 1;
                    state.queue_index = Some(next);
                    state.loaded_uri = state.queue.get(next).cloned();
                    state.position_ms = 0;
                    Some(next)
                }
                _ => {
                    state.transport = Some(TransportState::Ended);
                    state.is_playing = false;
                    None
                }
            }
        };

        match next {
            Some(index) => self.notify(|l| l.on_track_boundary(index)),
            None => {
                self.notify(|l| l.on_is_playing_changed(false));
                self.notify(|l| l.on_transport_state_changed(TransportState::Ended));
            }
        }
    }

    /// Simulate a fatal engine error on the current source.
    pub fn fail(&self, fault: EngineFault) {
        {
            let mut state = self.state.lock();
            state.transport = Some(TransportState::Error);
            state.is_playing = false;
        }
        self.notify(|l| l.on_is_playing_changed(false));
        self.notify(|l| l.on_transport_state_changed(TransportState::Error));
        self.notify(move |l| l.on_error(fault));
    }

    fn notify<F>(&self, f: F)
    where
        F: FnOnce(&dyn EngineListener),
    {
        let listener = self.listener.read().clone();
        if let Some(listener) = listener {
            f(listener.as_ref());
        }
    }

    fn record(&self, command: EngineCommand) -> Result<()> {
        let mut state = self.state.lock();
        if state.released {
            return Err(BridgeError::Released);
        }
        state.commands.push(command);
        Ok(())
    }

    fn check_source(&self, uri: &str) -> Result<()> {
        if self.rejected.read().contains(uri) {
            return Err(BridgeError::SourceRejected {
                uri: uri.to_string(),
                reason: "source cannot be opened".to_string(),
            });
        }
        Ok(())
    }

    fn start(&self, uri: &str, queue: Vec<String>, queue_index: Option<usize>) {
        {
            let mut state = self.state.lock();
            state.loaded_uri = Some(uri.to_string());
            state.queue = queue;
            state.queue_index = queue_index;
            state.position_ms = 0;
            state.transport = Some(TransportState::Buffering);
        }
        self.notify(|l| l.on_transport_state_changed(TransportState::Buffering));

        {
            let mut state = self.state.lock();
            state.transport = Some(TransportState::Ready);
            state.is_playing = true;
        }
        self.notify(|l| l.on_transport_state_changed(TransportState::Ready));
        self.notify(|l| l.on_is_playing_changed(true));
    }

    fn set_playing(&self, playing: bool) {
        let changed = {
            let mut state = self.state.lock();
            let can_play = state.transport == Some(TransportState::Ready);
            let target = playing && can_play;
            let changed = state.is_playing != target;
            state.is_playing = target;
            changed
        };
        if changed {
            let now_playing = playing;
            self.notify(move |l| l.on_is_playing_changed(now_playing));
        }
    }
}

#[async_trait]
impl MediaEngine for MemoryEngine {
    fn transport_state(&self) -> TransportState {
        self.state.lock().transport.unwrap_or(TransportState::Idle)
    }

    fn is_playing(&self) -> bool {
        self.state.lock().is_playing
    }

    fn position_ms(&self) -> u64 {
        self.state.lock().position_ms
    }

    fn duration(&self) -> EngineDuration {
        let state = self.state.lock();
        if !matches!(
            state.transport,
            Some(TransportState::Ready) | Some(TransportState::Ended)
        ) {
            return EngineDuration::Unknown;
        }
        state
            .loaded_uri
            .as_ref()
            .and_then(|uri| self.durations.read().get(uri).copied())
            .map(EngineDuration::Known)
            .unwrap_or(EngineDuration::Unknown)
    }

    fn set_listener(&self, listener: Option<Arc<dyn EngineListener>>) {
        *self.listener.write() = listener;
    }

    async fn load_and_play(&self, uri: &str) -> Result<()> {
        self.record(EngineCommand::LoadAndPlay(uri.to_string()))?;
        self.check_source(uri)?;
        self.start(uri, Vec::new(), None);
        Ok(())
    }

    async fn load_queue(&self, uris: Vec<String>, start_index: usize) -> Result<()> {
        self.record(EngineCommand::LoadQueue(uris.clone(), start_index))?;
        let uri = uris.get(start_index).cloned().ok_or_else(|| {
            BridgeError::OperationFailed(format!("queue index {start_index} out of range"))
        })?;
        self.check_source(&uri)?;
        self.start(&uri, uris, Some(start_index));
        Ok(())
    }

    async fn seek_to_item(&self, queue_index: usize) -> Result<()> {
        self.record(EngineCommand::SeekToItem(queue_index))?;
        let uri = {
            let state = self.state.lock();
            state.queue.get(queue_index).cloned().ok_or_else(|| {
                BridgeError::OperationFailed(format!("queue index {queue_index} out of range"))
            })?
        };
        self.check_source(&uri)?;
        let queue = std::mem::take(&mut self.state.lock().queue);
        self.start(&uri, queue, Some(queue_index));
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.record(EngineCommand::Pause)?;
        self.set_playing(false);
        Ok(())
    }

    async fn resume(&self) -> Result<()> {
        self.record(EngineCommand::Resume)?;
        self.set_playing(true);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        self.record(EngineCommand::Stop)?;
        let was_playing = {
            let mut state = self.state.lock();
            let was_playing = state.is_playing;
            state.transport = Some(TransportState::Idle);
            state.is_playing = false;
            state.loaded_uri = None;
            state.queue.clear();
            state.queue_index = None;
            state.position_ms = 0;
            was_playing
        };
        if was_playing {
            self.notify(|l| l.on_is_playing_changed(false));
        }
        self.notify(|l| l.on_transport_state_changed(TransportState::Idle));
        Ok(())
    }

    async fn seek(&self, position_ms: u64) -> Result<()> {
        self.record(EngineCommand::Seek(position_ms))?;
        self.state.lock().position_ms = position_ms;
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> Result<()> {
        self.record(EngineCommand::SetVolume(volume))?;
        self.state.lock().volume = volume;
        Ok(())
    }

    async fn set_speed(&self, speed: f32) -> Result<()> {
        self.record(EngineCommand::SetSpeed(speed))?;
        self.state.lock().speed = speed;
        Ok(())
    }

    async fn release(&self) -> Result<()> {
        self.record(EngineCommand::Release)?;
        {
            let mut state = self.state.lock();
            state.released = true;
            state.is_playing = false;
            state.transport = Some(TransportState::Idle);
        }
        *self.listener.write() = None;
        Ok(())
    }
}
