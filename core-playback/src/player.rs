//! # Player Capability
//!
//! [`MediaPlayer`] is the contract every backend adapter and every decorator
//! fulfils. Control operations return `()`: a player converts every engine
//! failure into a [`PlayerEvent::Error`](crate::PlayerEvent::Error) instead of
//! returning it, and after [`MediaPlayer::release`] every operation is a
//! silent no-op.
//!
//! The trait is object safe, so heterogeneous players can be held as
//! `Arc<dyn MediaPlayer>`. `Arc<P>` and `Box<P>` forward to `P`, which lets a
//! decorator wrap a shared handle.

use crate::events::PlayerEventStream;
use crate::state::PlaybackState;
use async_trait::async_trait;
use core_library::Track;
use core_runtime::config::{MAX_SPEED, MAX_VOLUME, MIN_SPEED, MIN_VOLUME};
use std::sync::Arc;

/// Shared, type-erased player handle.
pub type SharedPlayer = Arc<dyn MediaPlayer>;

#[async_trait]
pub trait MediaPlayer: Send + Sync {
    fn playback_state(&self) -> PlaybackState;

    /// Playhead position in milliseconds.
    fn current_position(&self) -> u64;

    /// Duration of the current track in milliseconds, 0 when unknown.
    fn duration(&self) -> u64;

    fn is_playing(&self) -> bool;

    fn current_track(&self) -> Option<Track>;

    /// Subscribe to every event emitted from now on.
    fn subscribe(&self) -> PlayerEventStream;

    /// Load and start `track`, replacing whatever is current.
    ///
    /// Emits `TrackChanged(Some(track))` on success or `Error` on failure
    /// before returning.
    async fn play_track(&self, track: Track);

    async fn pause(&self);

    async fn resume(&self);

    /// Stop playback and clear the current track. Emits `TrackChanged(None)`.
    async fn stop(&self);

    async fn seek_to(&self, position_ms: u64);

    /// Set the output volume, clamped to `[0.0, 1.0]`.
    async fn set_volume(&self, volume: f32);

    /// Set the playback speed, clamped to `[0.5, 2.0]`.
    async fn set_playback_speed(&self, speed: f32);

    /// Free the backend and close the event stream. Idempotent.
    async fn release(&self);

    /// Hand a queue to the backend and start at `start_index`.
    ///
    /// Backends without a queue ignore this.
    async fn set_playlist(&self, tracks: Vec<Track>, start_index: usize) {
        let _ = (tracks, start_index);
    }

    /// Move to the next item of the backend queue. No-op at the end.
    async fn skip_to_next(&self) {}

    /// Move to the previous item of the backend queue. No-op at the start.
    async fn skip_to_previous(&self) {}
}

/// Clamp a requested volume into the accepted range. NaN maps to silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return MIN_VOLUME;
    }
    volume.clamp(MIN_VOLUME, MAX_VOLUME)
}

/// Clamp a requested speed into the accepted range. NaN maps to normal speed.
pub fn clamp_speed(speed: f32) -> f32 {
    if speed.is_nan() {
        return 1.0;
    }
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

macro_rules! forward_media_player {
    ($wrapper:ident) => {
        #[async_trait]
        impl<P: MediaPlayer + ?Sized> MediaPlayer for $wrapper<P> {
            fn playback_state(&self) -> PlaybackState {
                (**self).playback_state()
            }

            fn current_position(&self) -> u64 {
                (**self).current_position()
            }

            fn duration(&self) -> u64 {
                (**self).duration()
            }

            fn is_playing(&self) -> bool {
                (**self).is_playing()
            }

            fn current_track(&self) -> Option<Track> {
                (**self).current_track()
            }

            fn subscribe(&self) -> PlayerEventStream {
                (**self).subscribe()
            }

            async fn play_track(&self, track: Track) {
                (**self).play_track(track).await
            }

            async fn pause(&self) {
                (**self).pause().await
            }

            async fn resume(&self) {
                (**self).resume().await
            }

            async fn stop(&self) {
                (**self).stop().await
            }

            async fn seek_to(&self, position_ms: u64) {
                (**self).seek_to(position_ms).await
            }

            async fn set_volume(&self, volume: f32) {
                (**self).set_volume(volume).await
            }

            async fn set_playback_speed(&self, speed: f32) {
                (**self).set_playback_speed(speed).await
            }

            async fn release(&self) {
                (**self).release().await
            }

            async fn set_playlist(&self, tracks: Vec<Track>, start_index: usize) {
                (**self).set_playlist(tracks, start_index).await
            }

            async fn skip_to_next(&self) {
                (**self).skip_to_next().await
            }

            async fn skip_to_previous(&self) {
                (**self).skip_to_previous().await
            }
        }
    };
}

forward_media_player!(Arc);
forward_media_player!(Box);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_volume() {
        assert_eq!(clamp_volume(-0.5), 0.0);
        assert_eq!(clamp_volume(0.3), 0.3);
        assert_eq!(clamp_volume(7.0), 1.0);
        assert_eq!(clamp_volume(f32::NAN), 0.0);
    }

    #[test]
    fn test_clamp_speed() {
        assert_eq!(clamp_speed(0.1), 0.5);
        assert_eq!(clamp_speed(1.25), 1.25);
        assert_eq!(clamp_speed(3.0), 2.0);
        assert_eq!(clamp_speed(f32::NAN), 1.0);
    }
}
