//! Core service façade.
//!
//! This crate is what a host UI talks to. [`PlayerFactory`] turns an engine
//! and a [`PlayerConfig`](core_runtime::config::PlayerConfig) into a fully
//! decorated [`PlayerStack`](core_playback::PlayerStack); [`PlayerSession`]
//! wraps that stack, loads tracks from a
//! [`TrackCatalog`](core_library::TrackCatalog), dispatches
//! [`PlayerIntent`]s and publishes a [`PlayerViewState`] for rendering.

pub mod error;
pub mod factory;
pub mod session;

pub use error::{Result, ServiceError};
pub use factory::PlayerFactory;
pub use session::{PlayerIntent, PlayerSession, PlayerViewState};
