//! Shared Error Types
//!
//! Error types shared between the client library and the server. Validation
//! of request payloads lives next to the DTOs in `shared`, so both sides
//! reject the same malformed input with the same message.
//!
//! # Error Categories
//!
//! - `ValidationError` - A request field failed validation
//!
//! # Usage
//!
//! ```rust
//! use chatbloom::shared::error::SharedError;
//!
//! let error = SharedError::validation("content", "Message cannot be empty");
//! assert!(error.to_string().contains("content"));
//! ```
use thiserror::Error;

/// Shared error types that can occur in both client and server code
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// Data validation error
    #[error("Invalid {field}: {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}
