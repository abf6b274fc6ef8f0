//! Error types for the selection runtime.

use thiserror::Error;

/// Scheduler-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The task ID is invalid, already ran, or was already cancelled.
    #[error("invalid or expired scheduled task id")]
    InvalidTaskId,
}

/// A specialized Result type for runtime operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;
