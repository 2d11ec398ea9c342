//! Handler for file uploads.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::storage::{sniff_media_type, MAX_IMAGE_SIZE};

/// Largest request body the upload route accepts.
pub const MAX_UPLOAD_SIZE: usize = 25 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub size: usize,
    pub media_type: &'static str,
    pub url: String,
}

/// Keep the last path component and drop characters unsafe in object keys.
fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// POST /api/v1/storage
///
/// Store the multipart field `file` and return where it can be fetched.
pub async fn upload(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or("file").to_string();
        let declared = field.content_type().map(str::to_owned);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let media_type = sniff_media_type(&data, &original, declared.as_deref())
            .ok_or_else(|| AppError::BadRequest("Unsupported file type".into()))?;
        if media_type.is_image() && data.len() > MAX_IMAGE_SIZE {
            return Err(AppError::BadRequest(format!(
                "Image size must not exceed {} MiB",
                MAX_IMAGE_SIZE / (1024 * 1024)
            )));
        }

        let filename = format!("{}_{}", Uuid::new_v4().simple(), sanitize_file_name(&original));
        let url = state
            .storage
            .save(&filename, &data, media_type.as_str())
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store upload: {e}")))?;

        tracing::info!(
            user_id = %auth.user_id,
            filename = %filename,
            size = data.len(),
            media_type = media_type.as_str(),
            "File uploaded"
        );
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                filename,
                size: data.len(),
                media_type: media_type.as_str(),
                url,
            }),
        ));
    }

    Err(AppError::BadRequest("Field `file` is required".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("photo.png"), "photo.png");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\docs\\cv 2024.pdf"), "cv2024.pdf");
        assert_eq!(sanitize_file_name(".."), "file");
    }
}
