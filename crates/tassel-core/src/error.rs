use thiserror::Error;

/// Application-wide error types for Tassel.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Standardizer service call failed.
    #[error("Standardizer error (HTTP {status_code}): {message}")]
    StandardizerError {
        message: String,
        status_code: u16,
        retryable: bool,
    },

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Reading or writing a record file failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Record store operation failed.
    #[error("Store error: {0}")]
    StoreError(String),
}
