//! # Decorators
//!
//! Each decorator wraps a [`MediaPlayer`](crate::MediaPlayer), forwards the
//! whole player contract to it unchanged and adds the surface of one
//! component:
//!
//! | Decorator | Component | Extra surface |
//! |-----------|-----------|---------------|
//! | [`PlaylistPlayer`] | [`Playlist`](crate::Playlist) | list editing, `play_next`/`play_previous` |
//! | [`PlaybackModePlayer`] | [`PlaybackModeController`](crate::PlaybackModeController) | mode selection, next/previous by mode |
//! | [`MultiAudioPlayer`] | [`MultiAudioRegistry`](crate::MultiAudioRegistry) | sub-players, focus, aggregate control |
//!
//! Decorators nest in any order. The extra surface of a lower layer is
//! reached through `inner()`, or through the shared component handle the
//! [`PlayerStack`](crate::PlayerStack) keeps.
//! `release()` releases the owned component once and forwards to the inner
//! player.

mod multi_audio;
mod playback_mode;
mod playlist;

pub use multi_audio::MultiAudioPlayer;
pub use playback_mode::PlaybackModePlayer;
pub use playlist::PlaylistPlayer;
