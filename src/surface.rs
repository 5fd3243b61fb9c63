//! Error surface: where fetch failures are announced.
//!
//! The adapter returns every failure to its caller as a
//! [`FetchError`](crate::error::FetchError). It additionally hands a
//! human-readable line to an [`ErrorSurface`] exactly once per failed
//! upstream call, so a dashboard can show a banner without threading errors
//! through its own code. Cache hits on a stored failure are not reported
//! again.
//!
//! # Implementations
//!
//! | Type | Behavior |
//! |------|----------|
//! | [`TracingSurface`] | Emits the message as a `tracing` error event (default) |
//! | [`NullSurface`] | Discards the message |

use tracing::error;

/// Sink for user-facing failure messages. Must not panic.
pub trait ErrorSurface: Send + Sync {
    fn report(&self, message: &str);
}

/// Reports through `tracing::error!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSurface;

impl ErrorSurface for TracingSurface {
    fn report(&self, message: &str) {
        error!(target: "news_tables::surface", "{message}");
    }
}

/// Drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl ErrorSurface for NullSurface {
    fn report(&self, _message: &str) {}
}

impl<F> ErrorSurface for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}
