//! Async runtime facade for the playback core.
//!
//! Every other crate in the workspace spawns tasks, sleeps and builds channels
//! through this crate rather than reaching for Tokio directly. Keeping the
//! runtime behind one seam means the periodic-task and cancellation rules used
//! by players live in a single place.
//!
//! # Modules
//!
//! - `task`: Task spawning, including cancellable periodic tasks
//! - `time`: Sleep, intervals and timeouts
//! - `sync`: Channels, locks and the cancellation token
//! - `runtime`: Blocking entry point for synchronous callers
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::task;
//! use core_async::time::Duration;
//!
//! # async fn example() {
//! let token = CancellationToken::new();
//! let handle = task::spawn_periodic(Duration::from_secs(1), token.clone(), || {
//!     println!("tick");
//! });
//!
//! token.cancel();
//! handle.await.ok();
//! # }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
