//! Signed reads for the local storage backend.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, Request, State},
    response::{IntoResponse, Response},
};
use fastreel_core::AppError;
use fastreel_storage::StorageError;
use serde::Deserialize;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

#[derive(Debug, Deserialize)]
pub struct SignedObjectQuery {
    pub expires: Option<String>,
    pub signature: Option<String>,
}

fn rejected(message: &str) -> AppError {
    AppError::Unauthorized(message.to_string())
}

/// Serve an object written by the local backend, after checking its read signature.
#[utoipa::path(
    get,
    path = "/objects/{bucket}/{key}",
    tag = "objects",
    params(
        ("bucket" = String, Path, description = "Bucket name"),
        ("key" = String, Path, description = "Object key"),
        ("expires" = u64, Query, description = "Unix expiry of the signed URL"),
        ("signature" = String, Query, description = "Hex HMAC-SHA256 signature")
    ),
    responses(
        (status = 200, description = "Object bytes"),
        (status = 401, description = "Missing, invalid or expired signature", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query, request), fields(bucket = %bucket, key = %key))]
pub async fn get_object(
    State(state): State<Arc<AppState>>,
    Path((bucket, key)): Path<(String, String)>,
    Query(query): Query<SignedObjectQuery>,
    request: Request,
) -> Result<Response, HttpAppError> {
    let local = state
        .local_storage
        .as_ref()
        .ok_or_else(|| AppError::NotFound("Object not found".to_string()))?;

    let expires = query
        .expires
        .as_deref()
        .and_then(|raw| raw.parse::<u64>().ok())
        .ok_or_else(|| rejected("Missing or invalid expires parameter"))?;
    let signature = query
        .signature
        .as_deref()
        .ok_or_else(|| rejected("Missing signature parameter"))?;

    let path = local
        .verify_signed_request(&bucket, &key, expires, signature)
        .map_err(|e| match e {
            StorageError::Rejected(msg) => rejected(&msg),
            StorageError::InvalidKey(_) => AppError::NotFound("Object not found".to_string()),
            other => AppError::from(other),
        })?;

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(AppError::NotFound("Object not found".to_string()).into());
    }

    let response = ServeFile::new(path)
        .oneshot(request)
        .await
        .map_err(|e| AppError::Io(e.to_string()))?;
    Ok(response.into_response())
}
