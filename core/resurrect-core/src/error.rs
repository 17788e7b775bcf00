//! Error types for resurrect-core operations.
//!
//! Most of the engine degrades to "not found" instead of failing. These errors
//! surface only where a caller must decide what to do: path resolution,
//! writing the session-record document, and talking to tmux.

use std::path::PathBuf;

/// All errors that can occur in resurrect-core operations.
#[derive(Debug, thiserror::Error)]
pub enum ResurrectError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Invalid setting {name}={value}: {reason}")]
    InvalidSetting {
        name: String,
        value: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },

    #[error("SQLite error: {context}: {source}")]
    Sqlite {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    // ─────────────────────────────────────────────────────────────────────
    // Collaborator Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Command execution failed: {command}: {details}")]
    CommandFailed { command: String, details: String },

    #[error("Unsupported tool: {0}")]
    UnsupportedTool(String),
}

impl ResurrectError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ResurrectError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        ResurrectError::Json {
            context: context.into(),
            source,
        }
    }
}

/// Convenience type alias for Results using ResurrectError.
pub type Result<T> = std::result::Result<T, ResurrectError>;

// Conversion for string error compatibility
impl From<ResurrectError> for String {
    fn from(err: ResurrectError) -> String {
        err.to_string()
    }
}
