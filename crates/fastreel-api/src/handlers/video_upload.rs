use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{load_owned_video, parse_video_id, signed_response, vanished};
use crate::state::AppState;
use crate::utils::upload::{receive_file_field, FieldLimits};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use fastreel_core::constants::VIDEO_FIELD_NAME;
use fastreel_core::models::VideoResponse;
use fastreel_core::AppError;
use std::sync::Arc;

/// Upload the video file of an existing draft.
///
/// Order matters: the ownership check runs before any temp file exists, and the content
/// type is checked before any external process runs. The received file and the remux
/// output are removed however the request ends.
#[utoipa::path(
    post,
    path = "/api/videos/{id}/video",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Field `video` with the MP4 file"),
    responses(
        (status = 200, description = "Video stored; `video_url` is a signed URL", body = VideoResponse),
        (status = 400, description = "Invalid id or multipart body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Content type not allowed", body = ErrorResponse),
        (status = 422, description = "No readable video stream", body = ErrorResponse),
        (status = 502, description = "Storage or signing failure", body = ErrorResponse),
        (status = 503, description = "Media processing capacity exhausted", body = ErrorResponse),
        (status = 504, description = "ffprobe or ffmpeg timed out", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, video_id = %id, operation = "upload_video")
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_video_id(&id)?;
    load_owned_video(&state, user, id).await?;

    let upload = receive_file_field(
        &mut multipart,
        VIDEO_FIELD_NAME,
        FieldLimits {
            policy: &state.uploads.video_types,
            temp_dir: &state.config.media.upload_temp_dir,
            max_size: state.uploads.max_video_size,
        },
    )
    .await?;
    let content_type = upload.media_type().essence().to_string();

    // Fires on shutdown, or when this future is dropped because the client went away.
    let cancel = state.shutdown.child_token();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let outcome = state.pipeline.ingest(&upload, &cancel).await?;
    drop(upload);

    // Only the video columns are written; anything changed during the ingest survives.
    let saved = state
        .repository
        .set_video_location(id, &outcome.locator, outcome.aspect, &content_type)
        .await
        .map_err(AppError::from)
        .and_then(|updated| updated.ok_or_else(vanished));
    let video = match saved {
        Ok(video) => video,
        Err(e) => {
            tracing::warn!(
                error = %e,
                bucket = %state.pipeline.bucket(),
                key = %outcome.key,
                "Video record not updated; stored object is orphaned"
            );
            return Err(e.into());
        }
    };

    tracing::info!(
        aspect = %outcome.aspect,
        key = %outcome.key,
        size_bytes = outcome.size_bytes,
        "Video upload complete"
    );

    Ok(Json(signed_response(&state, video).await?))
}
