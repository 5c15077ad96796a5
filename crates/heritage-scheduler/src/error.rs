//! Error types for the sleep daemon.

use thiserror::Error;

/// Errors returned by [`crate::SleepDaemon::start`].
///
/// Failures inside a tick never surface here; they are logged and counted.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// `start` was called outside a Tokio runtime
    #[error("No async runtime available: {0}")]
    NoRuntime(String),
}
