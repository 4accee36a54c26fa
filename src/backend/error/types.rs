/**
 * Backend Error Types
 *
 * This module defines the error taxonomy of the HTTP API. Every handler
 * returns `Result<_, BackendError>` and every failure maps to exactly one
 * status class:
 *
 * - `Unauthorized` - 401, missing or invalid session
 * - `Forbidden` - 403, role or ownership check failed
 * - `BadRequest` - 400, malformed or invalid input
 * - `NotFound` - 404, missing resource
 * - `Conflict` - 409, capacity or state conflict
 * - `Internal` - 500, anything unexpected
 *
 * Store, I/O and serialization failures convert into `Internal`; their
 * details are logged and never sent to the client.
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Message returned for every unclassified failure
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Backend error taxonomy
///
/// # Usage
///
/// ```rust
/// use chatbloom::backend::error::BackendError;
///
/// let err = BackendError::conflict("Room is full");
/// assert_eq!(err.status_code().as_u16(), 409);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// The caller has no valid session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller may not perform this action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The request is malformed or fails validation
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The addressed resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request conflicts with current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unclassified failure; the message is for logs only
    #[error("Internal error: {0}")]
    Internal(String),

    /// Validation error from the shared module
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Store error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Forbidden error for an action guests may not perform
    ///
    /// # Arguments
    ///
    /// * `action` - Verb phrase such as "upload media"
    pub fn guest_restricted(action: &str) -> Self {
        Self::Forbidden(format!(
            "Guests cannot {}. Please create an account.",
            action
        ))
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `SharedError::ValidationError` - 400 Bad Request
    /// - `Database(RowNotFound)` - 404 Not Found
    /// - store, I/O and serialization errors - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SharedError(SharedError::ValidationError { .. }) => StatusCode::BAD_REQUEST,
            Self::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing message
    ///
    /// Internal failures collapse to a generic message.
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::BadRequest(message)
            | Self::NotFound(message)
            | Self::Conflict(message) => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::Database(sqlx::Error::RowNotFound) => "Not found".to_string(),
            Self::Internal(_) | Self::Database(_) | Self::Io(_) | Self::SerializationError(_) => {
                INTERNAL_MESSAGE.to_string()
            }
        }
    }
}
