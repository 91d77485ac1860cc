//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the playback crates:
//! - Logging and tracing bootstrap
//! - Player configuration with validation
//! - Broadcast event bus with close-once semantics
//!
//! ## Overview
//!
//! Nothing in this crate knows about tracks or players. It fixes the
//! conventions (how events fan out, how configuration fails, how logs reach
//! the host) that `core-playback` and `core-service` build on.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
