//! Synchronization primitives.
//!
//! Async-aware locks and channels from `tokio::sync`, plus the cooperative
//! cancellation token used to stop background work when a player is released.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::watch;
//!
//! let (tx, rx) = watch::channel(0u32);
//! tx.send_replace(3);
//! assert_eq!(*rx.borrow(), 3);
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard,
};

pub use tokio_util::sync::{CancellationToken, DropGuard};
