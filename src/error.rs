//! Error types for the face filter library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON payload could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Camera could not be opened or stopped delivering frames
    #[error("Camera error: {0}")]
    Camera(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Landmark bridge process failed or answered garbage
    #[error("Detector error: {0}")]
    Detector(String),

    /// 3D asset could not be loaded or parsed
    #[error("Asset error: {0}")]
    Asset(String),

    /// Question bank is malformed
    #[error("Quiz error: {0}")]
    Quiz(String),

    /// A question was requested from a bank with no questions
    #[error("Question bank is empty")]
    EmptyQuestionBank,

    /// Smoothing filter initialization error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Application-specific error type (alias for main Error type)
pub type AppError = Error;

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
