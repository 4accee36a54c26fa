/**
 * Media Object Store
 *
 * Stores uploaded media on the local filesystem under
 * `<root>/<owner_id>/<object_id>.<ext>` and issues public URLs of the form
 * `<public_base_url>/media/<owner_id>/<object_id>.<ext>`. The `/media`
 * prefix is served by `tower_http::services::ServeDir` in the router.
 */

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::shared::message::MediaType;

/// URL path prefix the store is mounted under
pub const MEDIA_ROUTE: &str = "/media";

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Path relative to the store root, `/`-separated
    pub key: String,
    pub url: String,
    pub media_type: MediaType,
    pub size: usize,
}

/// Filesystem-backed media store
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL of a stored key
    pub fn public_url(&self, key: &str) -> String {
        format!("{}{}/{}", self.public_base_url, MEDIA_ROUTE, key)
    }

    /// Write an object owned by `owner_id`
    ///
    /// # Arguments
    /// * `owner_id` - Uploading user
    /// * `bytes` - Object content
    /// * `content_type` - Validated `image/*` or `audio/*` MIME type
    ///
    /// # Errors
    /// Returns the underlying I/O error, or `InvalidInput` for a content
    /// type that is neither image nor audio.
    pub async fn put(
        &self,
        owner_id: Uuid,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, std::io::Error> {
        let media_type = MediaType::from_mime(content_type).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unsupported content type {}", content_type),
            )
        })?;

        let owner_dir = self.root.join(owner_id.to_string());
        tokio::fs::create_dir_all(&owner_dir).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), file_extension(content_type));
        tokio::fs::write(owner_dir.join(&file_name), bytes).await?;

        let key = format!("{}/{}", owner_id, file_name);
        tracing::info!("[Media] Stored {} ({} bytes)", key, bytes.len());

        Ok(StoredObject {
            url: self.public_url(&key),
            key,
            media_type,
            size: bytes.len(),
        })
    }
}

/// File extension for a supported MIME type
pub fn file_extension(content_type: &str) -> &'static str {
    match content_type.to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/avif" => "avif",
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/ogg" => "ogg",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/webm" => "webm",
        "audio/mp4" | "audio/aac" => "m4a",
        "audio/flac" => "flac",
        _ => "bin",
    }
}

/// Whether a MIME type may be uploaded
///
/// SVG is rejected because it can carry script.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    let lower = content_type.to_lowercase();
    MediaType::from_mime(&lower).is_some() && lower != "image/svg+xml"
}
