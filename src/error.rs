//! CommGuard error types

use thiserror::Error;

/// CommGuard error type
#[derive(Error, Debug)]
pub enum Error {
    /// Request rejected before any detector ran
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Detector-reported failure
    #[error("Detector error: {0}")]
    Detector(String),

    /// Detector did not produce a report before the deadline
    #[error("Detector timed out")]
    DetectorTimeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for CommGuard operations
pub type Result<T> = std::result::Result<T, Error>;
