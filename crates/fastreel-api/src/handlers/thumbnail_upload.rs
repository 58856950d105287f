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
use fastreel_core::constants::THUMBNAIL_FIELD_NAME;
use fastreel_core::models::VideoResponse;
use fastreel_core::AppError;
use fastreel_storage::keys::random_token;
use std::sync::Arc;

/// URL path under which `ASSETS_ROOT` is served.
pub const ASSETS_ROUTE: &str = "/assets";

/// Upload a thumbnail image. Stored on local disk and served from `/assets`.
#[utoipa::path(
    post,
    path = "/api/videos/{id}/thumbnail",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "Field `thumbnail` with a JPEG or PNG image"),
    responses(
        (status = 200, description = "Thumbnail stored", body = VideoResponse),
        (status = 400, description = "Invalid id or multipart body", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Content type not allowed", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, video_id = %id, operation = "upload_thumbnail")
)]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_video_id(&id)?;
    load_owned_video(&state, user, id).await?;

    let upload = receive_file_field(
        &mut multipart,
        THUMBNAIL_FIELD_NAME,
        FieldLimits {
            policy: &state.uploads.thumbnail_types,
            temp_dir: &state.config.media.upload_temp_dir,
            max_size: state.uploads.max_thumbnail_size,
        },
    )
    .await?;

    let assets_root = &state.config.media.assets_root;
    let file_name = format!("{}.{}", random_token(), upload.media_type().extension());
    let destination = assets_root.join(&file_name);

    tokio::fs::create_dir_all(assets_root).await?;
    tokio::fs::copy(upload.path(), &destination).await?;
    drop(upload);

    let url = format!(
        "{}{}/{}",
        state.config.base.public_base_url, ASSETS_ROUTE, file_name
    );
    let saved = state
        .repository
        .set_thumbnail_url(id, &url)
        .await
        .map_err(AppError::from)
        .and_then(|updated| updated.ok_or_else(vanished));
    let video = match saved {
        Ok(video) => video,
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&destination).await {
                tracing::warn!(
                    error = %remove_err,
                    path = %destination.display(),
                    "Failed to remove thumbnail after persistence failure"
                );
            }
            return Err(e.into());
        }
    };

    tracing::info!(file_name = %file_name, "Thumbnail upload complete");

    Ok(Json(signed_response(&state, video).await?))
}
