//! Error types for chainsql

use thiserror::Error;

/// Result type alias for chainsql operations
pub type QbResult<T> = Result<T, QbError>;

/// Error types for query building and execution.
///
/// Two families matter to callers:
///
/// - [`QbError::Config`] is raised by the builder itself when a call violates
///   an invariant (empty `IN` list, negative `LIMIT`, missing INSERT data, ...).
///   These are programmer errors and are never retried.
/// - Everything else comes from the connection collaborator and is passed
///   through unchanged (see [`QbError::is_execution`]).
#[derive(Debug, Error)]
pub enum QbError {
    /// Builder misuse detected without touching the database
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by a connection or statement
    #[error("Execution error: {0}")]
    Execution(String),

    /// SQLite driver error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Row value could not be converted to the requested type
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl QbError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error was reported by the execution layer
    pub fn is_execution(&self) -> bool {
        match self {
            Self::Execution(_) => true,
            #[cfg(feature = "sqlite")]
            Self::Sqlite(_) => true,
            _ => false,
        }
    }
}
