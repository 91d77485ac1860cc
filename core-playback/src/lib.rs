//! # Playback Orchestration Core
//!
//! Composable media playback on top of a host [`MediaEngine`](bridge_traits::MediaEngine).
//!
//! ## Overview
//!
//! This crate provides:
//! - **Player capability**: the [`MediaPlayer`] trait and its [`PlayerEvent`] stream
//! - **Engine adapter**: [`EnginePlayer`], which drives an engine and translates
//!   its callbacks into events
//! - **Components**: [`Playlist`], [`PlaybackModeController`] (backed by the
//!   [`Sequencer`]) and [`MultiAudioRegistry`]
//! - **Decorators**: [`PlaylistPlayer`], [`PlaybackModePlayer`] and
//!   [`MultiAudioPlayer`], which add a component to any player
//! - **Stack builder**: [`PlayerStack`], a typed assembly of the decorators
//!
//! ## Errors
//!
//! Control operations never fail: engine failures surface as
//! [`PlayerEvent::Error`]. [`PlaybackError`] is returned only by synchronous
//! rejections such as registering a sub-player as `"main"`.

pub mod decorators;
pub mod engine;
pub mod error;
pub mod events;
pub mod multi_audio;
pub mod playback_mode;
pub mod player;
pub mod playlist;
pub mod sequencing;
pub mod stack;
pub mod state;

pub use decorators::{MultiAudioPlayer, PlaybackModePlayer, PlaylistPlayer};
pub use engine::EnginePlayer;
pub use error::{PlaybackError, Result};
pub use events::{PlayerEvent, PlayerEventBus, PlayerEventStream};
pub use multi_audio::{MultiAudioRegistry, PlayerId};
pub use playback_mode::PlaybackModeController;
pub use player::{MediaPlayer, SharedPlayer};
pub use playlist::{Playlist, PlaylistObserver, PlaylistSnapshot};
pub use sequencing::{Sequencer, ShuffleOrder};
pub use stack::{PlayerStack, PlayerStackBuilder};
pub use state::{PlaybackMode, PlaybackState};

pub use core_library::Track;
