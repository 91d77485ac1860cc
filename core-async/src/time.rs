//! Time-related abstractions.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(10)).await;
//!     println!("Took {:?}", start.elapsed());
//! }
//! ```

pub use tokio::time::{interval, sleep, timeout, Interval, MissedTickBehavior, Sleep, Timeout};

pub use std::time::{Duration, Instant};
