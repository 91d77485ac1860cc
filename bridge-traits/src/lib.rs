//! # Host Bridge Traits
//!
//! Capabilities the playback core requires from its host but does not
//! implement itself.
//!
//! ## Traits
//!
//! ### Media
//! - [`MediaEngine`](media::MediaEngine) - Decodes and renders audio from a URI
//!   and reports raw transport state
//! - [`EngineListener`](media::EngineListener) - Callback sink the engine
//!   notifies on its own notification path
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Reference implementations
//!
//! [`MemoryEngine`](media::MemoryEngine) and
//! [`ConsoleLogger`](logging::ConsoleLogger) are in-process implementations meant
//! for development and tests. Production hosts inject a native engine
//! (ExoPlayer, AVPlayer, GStreamer, ...).
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors and keep the source URI in the message where
//! one is involved.
//!
//! ## Thread Safety
//!
//! Bridge traits require `Send + Sync`; the core shares engines across tasks
//! and receives callbacks from engine-owned threads.

pub mod error;
pub mod logging;
pub mod media;

pub use error::BridgeError;

pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{
    EngineCommand, EngineDuration, EngineFault, EngineListener, MediaEngine, MemoryEngine,
    TransportState,
};
