//! Runtime utilities that abstract over the underlying async executor.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a lightweight current-thread
/// runtime.
///
/// Intended for synchronous call sites (for example a `tracing` layer) that
/// have no ambient runtime. Returns `None` if the runtime cannot be built.
pub fn block_on<F>(future: F) -> Option<F::Output>
where
    F: std::future::Future,
{
    match Builder::new_current_thread().enable_all().build() {
        Ok(rt) => Some(rt.block_on(future)),
        Err(err) => {
            tracing::error!(error = %err, "Failed to build blocking runtime");
            None
        }
    }
}
