//! Error types for the node supervisor

use std::path::PathBuf;
use thiserror::Error;

/// Supervisor errors
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// The node executable could not be started
    #[error("Failed to spawn node process {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The process abstraction reported an error after launch
    #[error("Node process error: {reason}")]
    ProcessRuntime { reason: String },

    /// The node exited with code 1 without being asked to
    #[error("Node non zero exit code. logs: {logs}")]
    NodeCrashed { logs: String },

    /// A signal could not be delivered
    #[error("Failed to deliver {signal} to node process: {reason}")]
    Signal { signal: &'static str, reason: String },

    /// A signal transition was requested with no live process
    #[error("No node process is running")]
    NoProcess,

    /// Persisted settings could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SupervisorError {
    /// Underlying cause, suitable for the body of an error dialog.
    pub fn detail(&self) -> String {
        match self {
            Self::Spawn { reason, .. }
            | Self::ProcessRuntime { reason }
            | Self::Signal { reason, .. } => reason.clone(),
            Self::NodeCrashed { logs } => logs.clone(),
            other => other.to_string(),
        }
    }
}

/// Settings store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed
    #[error("Settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings document could not be encoded or decoded
    #[error("Settings document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for supervisor operations
pub type SupervisorResult<T> = Result<T, SupervisorError>;
