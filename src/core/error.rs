/// QuantDB Error Module
///
/// This module defines the error types for the quantdb client. Every failure
/// surfaces to the caller unchanged; nothing here is recovered locally.
use thiserror::Error;

/// Error type for all client operations.
///
/// Variants follow the client lifecycle:
/// - Establishing the connection (`Connection`)
/// - Using the client while disconnected (`NotConnected`)
/// - Running read statements (`Query`) and write statements (`Command`)
/// - Rejecting caller input before any I/O (`Argument`)
/// - Loading configuration (`Config`, `Io`)
#[derive(Error, Debug)]
pub enum QuantDbError {
    /// Cannot reach the server, authenticate, or select the database
    #[error("Connection error: {0}")]
    Connection(String),

    /// An operation other than `connect` was attempted without a live connection
    #[error("Not connected: cannot {0} before connect() or after close()")]
    NotConnected(&'static str),

    /// Read-path failures (syntax, type mismatch, lost connection)
    #[error("Query error: {0}")]
    Query(String),

    /// Write-path failures; no commit was attempted
    #[error("Command error: {0}")]
    Command(String),

    /// Invalid caller input, rejected before touching the database
    #[error("Argument error: {0}")]
    Argument(String),

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for QuantDbError {
    fn from(err: toml::de::Error) -> Self {
        QuantDbError::Config(err.to_string())
    }
}

/// Type alias for Result to use QuantDbError as the error type.
pub type Result<T> = std::result::Result<T, QuantDbError>;
