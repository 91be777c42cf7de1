//! Error types for the SubHunt environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// A spawned task panicked or was cancelled before completing.
    #[error("Task '{name}' failed: {reason}")]
    TaskFailed {
        /// Name the task was spawned under
        name: String,
        /// Underlying join failure
        reason: String,
    },

    /// Context operation failed
    #[error("Context error: {0}")]
    ContextError(String),
}

impl EnvError {
    /// Creates a task failure from a tokio join error.
    pub fn task_failed(name: impl Into<String>, err: tokio::task::JoinError) -> Self {
        Self::TaskFailed {
            name: name.into(),
            reason: err.to_string(),
        }
    }
}
