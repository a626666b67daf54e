//! User-facing error notifications.
//!
//! Cart operations report every failure to an injected sink as a short
//! human-readable message (toast-style). The sink is fire-and-forget: no
//! return value, no acknowledgement.

use tracing::error;

/// Receiver of user-facing error messages.
pub trait NotificationSink: Send + Sync {
    /// Deliver one error message to the user.
    fn error(&self, message: &str);
}

/// Sink that emits messages as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn error(&self, message: &str) {
        error!(target: "shopfront::notify", "{message}");
    }
}

/// Sink that discards all messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn error(&self, _message: &str) {}
}
