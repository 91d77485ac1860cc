//! Player state and playback mode values.

use bridge_traits::TransportState;
use core_runtime::config::{PlayerConfig, RepeatMode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally visible playback state.
///
/// Derived on demand from the engine's transport state and playing flag; it
/// is never stored as the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Ended,
    Error,
}

impl PlaybackState {
    /// Map an engine transport state as reported by a callback.
    ///
    /// Callbacks carry no playing flag, so `Ready` maps to `Ready` here; use
    /// [`PlaybackState::derive`] when the flag is known.
    pub fn from_transport(state: TransportState) -> Self {
        match state {
            TransportState::Idle => PlaybackState::Idle,
            TransportState::Buffering => PlaybackState::Loading,
            TransportState::Ready => PlaybackState::Ready,
            TransportState::Ended => PlaybackState::Ended,
            TransportState::Error => PlaybackState::Error,
        }
    }

    /// Full derivation from the engine snapshot plus player-side flags.
    pub fn derive(transport: TransportState, is_playing: bool, paused: bool) -> Self {
        match transport {
            TransportState::Ready if is_playing => PlaybackState::Playing,
            TransportState::Ready if paused => PlaybackState::Paused,
            other => Self::from_transport(other),
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loading => "loading",
            PlaybackState::Ready => "ready",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Ended => "ended",
            PlaybackState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Track sequencing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    #[default]
    Normal,
    RepeatOne,
    Shuffle,
}

impl PlaybackMode {
    /// Initial mode for a player built from `config`. Shuffle wins over repeat.
    pub fn from_config(config: &PlayerConfig) -> Self {
        if config.shuffle {
            PlaybackMode::Shuffle
        } else if config.repeat_mode == RepeatMode::One {
            PlaybackMode::RepeatOne
        } else {
            PlaybackMode::Normal
        }
    }
}
