//! Client error type.

use thiserror::Error;

/// Failure of a call to the ChatBloom API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Request failed ({status}): {message}")]
    Status { status: u16, message: String },

    /// The response body did not match the expected shape
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A 403 telling a guest to register before retrying
    pub fn requires_account(&self) -> bool {
        match self {
            ApiError::Status { status: 403, message } => message.to_lowercase().contains("create an account"),
            _ => false,
        }
    }
}
