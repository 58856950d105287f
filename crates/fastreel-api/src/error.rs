//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that converts into
//! `AppError` (processing, storage and repository errors included) becomes an
//! `HttpAppError` with `?` and renders with a consistent status, body and log line.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fastreel_core::{AppError, ErrorMetadata, LogLevel};
use fastreel_db::RepositoryError;
use fastreel_processing::ProcessingError;
use fastreel_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use utoipa::ToSchema;

static HIDE_ERROR_DETAILS: AtomicBool = AtomicBool::new(false);

/// Hide `details` and `error_type` from every error body. Set once at startup in production.
pub fn set_hide_error_details(hide: bool) {
    HIDE_ERROR_DETAILS.store(hide, Ordering::Relaxed);
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    /// Suggested action for the client (e.g., "Wait 30-60 seconds and retry")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    fn from_app_error(error: &AppError, with_details: bool) -> Self {
        Self {
            error: error.client_message(),
            details: with_details.then(|| error.detailed_message()),
            error_type: with_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from fastreel-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<std::io::Error> for HttpAppError {
    fn from(err: std::io::Error) -> Self {
        HttpAppError(err.into())
    }
}

impl From<ProcessingError> for HttpAppError {
    fn from(err: ProcessingError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<RepositoryError> for HttpAppError {
    fn from(err: RepositoryError) -> Self {
        HttpAppError(err.into())
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    let code = error.error_code();
    let kind = error.kind();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type, code, kind = ?kind, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type, code, kind = ?kind, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type,
                code,
                kind = ?kind,
                "Request failed"
            );
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Sensitive errors never expose internals; nothing does in production.
        let with_details =
            !HIDE_ERROR_DETAILS.load(Ordering::Relaxed) && !app_error.is_sensitive();

        (
            status,
            Json(ErrorResponse::from_app_error(app_error, with_details)),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn status_and_body(err: HttpAppError) -> (StatusCode, ErrorResponse) {
        let status = StatusCode::from_u16(err.0.http_status_code()).unwrap();
        let body = ErrorResponse::from_app_error(&err.0, !err.0.is_sensitive());
        (status, body)
    }

    #[test]
    fn busy_gate_renders_as_service_busy() {
        let (status, body) = status_and_body(ProcessingError::Busy(Duration::from_secs(30)).into());
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.code, "SERVICE_BUSY");
        assert!(body.recoverable);
    }

    #[test]
    fn storage_failures_hide_details() {
        let err: HttpAppError =
            StorageError::UploadFailed("bucket policy denies s3:PutObject".to_string()).into();
        let (status, body) = status_and_body(err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "STORAGE_ERROR");
        assert_eq!(body.error, "Failed to access storage");
        assert!(body.details.is_none());
    }

    #[test]
    fn signing_failure_keeps_its_own_code() {
        let err: HttpAppError = StorageError::SigningFailed("no credentials".to_string()).into();
        let (status, body) = status_and_body(err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.code, "SIGNING_FAILED");
    }

    #[test]
    fn validation_errors_carry_details_outside_production() {
        let err = HttpAppError(AppError::Forbidden("not your video".to_string()));
        let (status, body) = status_and_body(err);
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body.error, "not your video");
        assert_eq!(body.error_type.as_deref(), Some("Forbidden"));
    }

    /// Verifies the public error response contract: serialized ErrorResponse has "error",
    /// "code", "recoverable", and optionally "details" / "error_type" / "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse::from_app_error(
            &AppError::UnsupportedMediaType("video/avi".to_string()),
            false,
        );
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert_eq!(json["error"], "video/avi");
        assert_eq!(json["recoverable"], false);
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
    }
}
