//! Error types for the control layer
use thiserror::Error;

/// Control-layer errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// A required request field was missing or malformed
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No row matched the request
    #[error("not found: {0}")]
    NotFound(String),

    /// Data-store failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP server failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
