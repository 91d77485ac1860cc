//! Task spawning and execution abstractions.
//!
//! Besides plain [`spawn`], this module provides [`spawn_periodic`]: a ticker
//! bound to a [`CancellationToken`]. Players use it for position reporting so
//! that releasing the owner deterministically stops the timer.
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//!
//! # async fn example() {
//! let handle = task::spawn(async { 42 });
//! assert_eq!(handle.await.unwrap(), 42);
//! # }
//! ```

use crate::sync::CancellationToken;
use crate::time::{self, Duration, MissedTickBehavior};

pub use tokio::task::{spawn_blocking, yield_now, AbortHandle, JoinError, JoinHandle};

/// Spawns a new asynchronous task on the Tokio runtime.
///
/// Must be called from within a runtime context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Spawns a task that invokes `on_tick` once per `period` until `token` is
/// cancelled.
///
/// The first tick fires one full `period` after spawning. Ticks missed while
/// the runtime was busy are skipped rather than replayed in a burst.
pub fn spawn_periodic<F>(period: Duration, token: CancellationToken, mut on_tick: F) -> JoinHandle<()>
where
    F: FnMut() + Send + 'static,
{
    spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // `interval` completes its first tick immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => on_tick(),
            }
        }
    })
}

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
