//! Player events.
//!
//! Every player publishes [`PlayerEvent`]s on a [`PlayerEventBus`]. Events
//! caused by one engine callback sequence arrive in the order the engine
//! fired them. Position reports come from a separate timer and may interleave
//! with callback-driven events in any order.

use crate::state::PlaybackState;
use core_library::Track;
use core_runtime::events::{EventBus, EventStream};
use serde::{Deserialize, Serialize};

/// Event bus carrying player events.
pub type PlayerEventBus = EventBus<PlayerEvent>;

/// Subscriber end of a [`PlayerEventBus`].
pub type PlayerEventStream = EventStream<PlayerEvent>;

/// Message used when the engine reports an error without one.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown playback error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// The current track changed. `None` after `stop()`.
    TrackChanged(Option<Track>),
    PlaybackStateChanged(PlaybackState),
    IsPlayingChanged(bool),
    /// Playhead position in milliseconds.
    PositionChanged(u64),
    /// Duration of the current track in milliseconds.
    DurationChanged(u64),
    /// An operation could not complete.
    Error {
        message: String,
        cause: Option<String>,
    },
}

impl PlayerEvent {
    pub fn error(message: impl Into<String>, cause: Option<String>) -> Self {
        PlayerEvent::Error {
            message: message.into(),
            cause,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlayerEvent::Error { .. })
    }

    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PlayerEvent::TrackChanged(_) => "track_changed",
            PlayerEvent::PlaybackStateChanged(_) => "playback_state_changed",
            PlayerEvent::IsPlayingChanged(_) => "is_playing_changed",
            PlayerEvent::PositionChanged(_) => "position_changed",
            PlayerEvent::DurationChanged(_) => "duration_changed",
            PlayerEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_serialization() {
        let event = PlayerEvent::error("Failed to play track: Song", Some("boom".into()));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["payload"]["message"], "Failed to play track: Song");
        assert_eq!(json["payload"]["cause"], "boom");
        assert!(event.is_error());
    }

    #[test]
    fn test_track_cleared_serialization() {
        let json = serde_json::to_string(&PlayerEvent::TrackChanged(None)).unwrap();
        assert_eq!(json, r#"{"type":"track_changed","payload":null}"#);
        assert_eq!(PlayerEvent::PositionChanged(5).kind(), "position_changed");
    }
}
