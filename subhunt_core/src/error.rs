//! Error types for the SubHunt game engine.
//!
//! Setup failures (`LogStorage`, `InvalidConfig`, `ConfigFile`) are fatal and
//! surface before any agent starts. Log overflow, repeated cells and
//! post-game attack attempts are normal outcomes and never reach this type.

use std::path::PathBuf;
use subhunt_env::EnvError;
use thiserror::Error;

/// Errors produced by the SubHunt engine.
#[derive(Debug, Error)]
pub enum HuntError {
    /// The event log file could not be created or sized.
    #[error("Log storage unavailable at {path}: {source}")]
    LogStorage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A startup parameter is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration file could not be read or parsed.
    #[error("Config file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    /// An agent panicked while holding the board lock.
    #[error("Game state lock poisoned")]
    StatePoisoned,

    /// Environment failure (task join, context).
    #[error(transparent)]
    Env(#[from] EnvError),
}

impl HuntError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates a log storage error for the given path.
    pub fn log_storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LogStorage {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, HuntError>;
