//! Media Upload Handler

use axum::{
    extract::{multipart::Field, State},
    http::StatusCode,
};

use crate::backend::error::BackendError;
use crate::backend::media::storage::is_allowed_content_type;
use crate::backend::middleware::{AuthUser, Json, Multipart};
use crate::backend::server::state::AppState;
use crate::shared::media::UploadResponse;

/// Upload an image or audio file
///
/// Expects `multipart/form-data` with a `file` part carrying its own
/// content type. Other parts are ignored.
///
/// # Errors
///
/// * `401 Unauthorized` - no session
/// * `403 Forbidden` - guest session
/// * `400 Bad Request` - missing file, unsupported type, empty or oversize file
pub async fn upload_media(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Multipart(mut multipart): Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), BackendError> {
    user.require_account("upload media")?;

    let limit = state.config.max_upload_bytes;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !is_allowed_content_type(&content_type) {
            tracing::warn!("[Media] Upload rejected, unsupported content type: {}", content_type);
            return Err(BackendError::bad_request("Only image and audio files can be uploaded"));
        }

        let bytes = read_capped(field, limit).await?;
        upload = Some((content_type, bytes));
        break;
    }

    let (content_type, bytes) = upload.ok_or_else(|| BackendError::bad_request("Missing file"))?;
    if bytes.is_empty() {
        return Err(BackendError::bad_request("File is empty"));
    }

    let stored = state.media.put(user.user_id, &bytes, &content_type).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: stored.url,
            media_type: stored.media_type,
            size: stored.size,
        }),
    ))
}

async fn read_capped(mut field: Field<'_>, limit: usize) -> Result<Vec<u8>, BackendError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if bytes.len() + chunk.len() > limit {
            tracing::warn!("[Media] Upload rejected, exceeds {} bytes", limit);
            return Err(too_large(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

fn too_large(limit: usize) -> BackendError {
    BackendError::bad_request(format!(
        "File exceeds the {} MB limit",
        limit / (1024 * 1024)
    ))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> BackendError {
    tracing::warn!("[Media] Malformed multipart body: {}", err);
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        BackendError::bad_request("File exceeds the upload limit")
    } else {
        BackendError::bad_request("Malformed multipart body")
    }
}
