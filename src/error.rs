// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Errors the public API can surface.

/// Errors returned by the `try_submit_*` family of methods.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Returned when the pool was built with
    /// [`crate::pool::PoolBuilder::reject_after_shutdown(true)`] and a
    /// shutdown has already been requested.
    #[error("thread pool is shutting down; task was rejected")]
    ShuttingDown,
}
