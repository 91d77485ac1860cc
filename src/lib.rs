//! Workspace umbrella crate.
//!
//! Re-exports the playback core and, behind the `session` feature, the
//! presentation-side session façade so host applications can depend on a
//! single crate.

pub use core_playback as playback;

#[cfg(feature = "session")]
pub use core_service as session;
