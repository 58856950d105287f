use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    http::header::CONTENT_LENGTH,
    middleware::Next,
    response::{IntoResponse, Response},
};
use fastreel_core::AppError;

/// Turn away requests whose declared length exceeds `limit` before the handler runs.
///
/// Bodies without a `Content-Length` are bounded while streaming instead.
pub async fn reject_oversized_body(
    State(limit): State<u64>,
    request: Request,
    next: Next,
) -> Response {
    let declared = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    if let Some(length) = declared {
        if length > limit {
            tracing::debug!(content_length = length, limit = limit, "Request body too large");
            return HttpAppError(AppError::PayloadTooLarge(format!(
                "Request body of {} bytes exceeds the limit of {} bytes",
                length, limit
            )))
            .into_response();
        }
    }

    next.run(request).await
}
