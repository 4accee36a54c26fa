//! Media Upload Types

use serde::{Deserialize, Serialize};

use crate::shared::message::MediaType;

/// Largest accepted upload (5 MiB)
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Response of `POST /api/media`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    /// Public URL to reference from a message
    pub url: String,
    pub media_type: MediaType,
    pub size: usize,
}
