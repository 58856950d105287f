pub mod health;
pub mod objects;
pub mod thumbnail_upload;
pub mod video_create;
pub mod video_get;
pub mod video_upload;

use crate::auth::UserContext;
use crate::state::AppState;
use fastreel_core::models::VideoResponse;
use fastreel_core::{AppError, VideoAsset};
use uuid::Uuid;

/// Parse a path id. Rejected ids use our error body rather than axum's plain-text one.
pub(crate) fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(format!("Invalid video id: {}", raw)))
}

/// Load a video the caller owns: `NotFound` if missing, `Forbidden` for anyone else's.
pub(crate) async fn load_owned_video(
    state: &AppState,
    user: UserContext,
    id: Uuid,
) -> Result<VideoAsset, AppError> {
    let video = state
        .repository
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Video not found".to_string()))?;

    user.ensure_owner(video.user_id)?;
    Ok(video)
}

/// Client view of a video with its locator passed through the access URL signer.
pub(crate) async fn signed_response(
    state: &AppState,
    video: VideoAsset,
) -> Result<VideoResponse, AppError> {
    let video_url = state.signer.sign(video.video_url.as_deref()).await?;
    let mut response = VideoResponse::from(video);
    response.video_url = video_url;
    Ok(response)
}

/// A record that disappeared between lookup and write.
pub(crate) fn vanished() -> AppError {
    AppError::NotFound("Video not found".to_string())
}
