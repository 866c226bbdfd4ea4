//! Error Types

use thiserror::Error;

/// Result type alias for form operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Shown when the storage backend fails without saying why.
pub const FALLBACK_ERROR_MESSAGE: &str =
    "Error processing request. Check your storage table schema.";

/// Form error types
///
/// Field edits never fail; only the submission path produces errors.
#[derive(Error, Debug)]
pub enum FormError {
    /// Storage write failed, with the backend's description if it gave one
    #[error("{}", .0.as_deref().unwrap_or(FALLBACK_ERROR_MESSAGE))]
    SubmissionFailed(Option<String>),

    /// Storage configuration missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FormError {
    /// Failure carrying a description from the storage backend
    pub fn submission(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            FormError::SubmissionFailed(None)
        } else {
            FormError::SubmissionFailed(Some(message))
        }
    }

    /// Check if a fresh submit could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, FormError::SubmissionFailed(_))
    }

    /// Message rendered in the error banner
    pub fn user_message(&self) -> String {
        match self {
            FormError::SubmissionFailed(Some(msg)) => msg.clone(),
            FormError::SubmissionFailed(None) => FALLBACK_ERROR_MESSAGE.into(),
            FormError::Config(_) | FormError::Serialization(_) => self.to_string(),
        }
    }
}

impl From<anyhow::Error> for FormError {
    fn from(err: anyhow::Error) -> Self {
        FormError::submission(err.to_string())
    }
}
