//! Error types for taskbench
//!
//! This module provides error handling types used throughout the library.

use thiserror::Error;

/// Main error type for taskbench operations
///
/// `Clone` is required because a task's terminal outcome is shared by
/// every waiter on its handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The work unit's body returned an error or panicked
    #[error("task failed: {reason}")]
    TaskFailed {
        /// Reason for the task failure
        reason: String,
    },

    /// A wait deadline elapsed before the task(s) reached a terminal state
    #[error("operation timed out")]
    Timeout,

    /// The task was cancelled before it began executing
    #[error("task was cancelled")]
    Cancelled,

    /// Submission was attempted after the strategy stopped accepting work
    #[error("strategy is shut down")]
    Shutdown,

    /// Spawning an execution thread failed
    #[error("failed to spawn thread: {reason}")]
    Spawn {
        /// Reason for the spawn failure
        reason: String,
    },
}

/// Convenient result type alias
pub type Result<T> = std::result::Result<T, Error>;
