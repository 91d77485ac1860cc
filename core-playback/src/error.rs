//! # Playback Error Types
//!
//! Players never return these from control operations; engine failures are
//! reported as [`PlayerEvent::Error`](crate::PlayerEvent::Error). The errors
//! here cover synchronous rejections on the extended surfaces, such as
//! registering a sub-player under the reserved id.

use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The id is reserved for the main player.
    #[error("Player id '{0}' is reserved for the main player")]
    ReservedPlayerId(String),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlaybackError::ReservedPlayerId("main".to_string());
        assert_eq!(
            err.to_string(),
            "Player id 'main' is reserved for the main player"
        );
    }
}
