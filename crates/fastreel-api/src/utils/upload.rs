//! Common utilities for file upload handlers

use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use fastreel_core::AppError;
use fastreel_processing::{ContentTypePolicy, ReceivedFile, UploadSession};
use std::path::Path;

/// Where and how large a received file part may be.
pub struct FieldLimits<'a> {
    pub policy: &'a ContentTypePolicy,
    pub temp_dir: &'a Path,
    pub max_size: u64,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Stream the part named `field_name` into a scoped temp file.
///
/// The declared content type is checked before anything touches the disk. Other parts
/// are skipped. The returned file is removed when dropped, and so is a partially written
/// one when this fails.
pub async fn receive_file_field(
    multipart: &mut Multipart,
    field_name: &str,
    limits: FieldLimits<'_>,
) -> Result<ReceivedFile, AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(field_name) {
            continue;
        }

        let media_type = limits.policy.validate(field.content_type())?;
        let mut session =
            UploadSession::create(limits.temp_dir, media_type, limits.max_size).await?;

        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            session.write_chunk(&chunk).await?;
        }

        return Ok(session.finish().await?);
    }

    Err(AppError::InvalidInput(format!(
        "No file provided; send one multipart field named '{}'",
        field_name
    )))
}
