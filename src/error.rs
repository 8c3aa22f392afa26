// this_file: src/error.rs
//! Error types for the wallnote library

use thiserror::Error;

/// Main error type for wallnote operations
#[derive(Debug, Error)]
pub enum Error {
    /// Font file loading or parsing error
    #[error("Font error: {0}")]
    Font(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Invalid input parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for wallnote operations
pub type Result<T> = std::result::Result<T, Error>;
