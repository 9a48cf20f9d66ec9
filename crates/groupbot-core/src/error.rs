//! GroupBot error type.

use thiserror::Error;

/// Errors surfaced by GroupBot subsystems.
#[derive(Error, Debug)]
pub enum GroupBotError {
    /// Directory (Graph) API call failed.
    #[error("Graph API error: {0}")]
    Graph(String),

    /// Record store read or write failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Messaging transport delivery failed.
    #[error("Messaging error: {0}")]
    Messaging(String),

    /// Grouping input produced an invalid shape (out-of-range units,
    /// degenerate group counts).
    #[error("Invalid grouping: {0}")]
    InvalidSplit(String),

    /// Configuration load or parse failure.
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, GroupBotError>;
