use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::handlers::{load_owned_video, parse_video_id, signed_response};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use fastreel_core::models::VideoResponse;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = VideoResponse),
        (status = 403, description = "Video belongs to another user", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 502, description = "Access URL could not be issued", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, video_id = %id, operation = "get_video")
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_video_id(&id)?;
    let video = load_owned_video(&state, user, id).await?;
    Ok(Json(signed_response(&state, video).await?))
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    params(ListQuery),
    responses(
        (status = 200, description = "The caller's videos, newest first", body = Vec<VideoResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 502, description = "Access URL could not be issued", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, params),
    fields(
        user_id = %user.user_id,
        limit = params.limit,
        offset = params.offset,
        operation = "list_videos"
    )
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Query(params): Query<ListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let limit = params.limit.clamp(1, 100);
    let offset = params.offset.max(0);

    let videos = state
        .repository
        .list_by_user(user.user_id, limit, offset)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to list videos");
            HttpAppError::from(e)
        })?;

    let mut responses = Vec::with_capacity(videos.len());
    for video in videos {
        responses.push(signed_response(&state, video).await?);
    }

    Ok(Json(responses))
}
