use fastreel_core::AppError;
use fastreel_storage::StorageError;
use std::time::Duration;

/// Failures of the ingest path, one variant per stage outcome.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Unsupported content type: {content_type} (allowed: {allowed:?})")]
    UnsupportedMediaType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File too large (max: {max} bytes)")]
    PayloadTooLarge { max: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Video metadata unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("Remux failed: {0}")]
    RemuxFailed(String),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: &'static str, message: String },

    #[error("{tool} timed out after {timeout:?}")]
    ToolTimeout {
        tool: &'static str,
        timeout: Duration,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Media processing capacity exhausted (waited {0:?})")]
    Busy(Duration),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl From<ProcessingError> for AppError {
    fn from(err: ProcessingError) -> Self {
        let message = err.to_string();
        match err {
            ProcessingError::UnsupportedMediaType { .. } => AppError::UnsupportedMediaType(message),
            ProcessingError::PayloadTooLarge { .. } => AppError::PayloadTooLarge(message),
            ProcessingError::Io(_) => AppError::Io(message),
            ProcessingError::MetadataUnavailable(_) => AppError::MetadataUnavailable(message),
            ProcessingError::RemuxFailed(_) => AppError::RemuxFailed(message),
            ProcessingError::ToolFailed { .. } => AppError::ExternalTool(message),
            ProcessingError::ToolTimeout { .. } => AppError::ExternalToolTimeout(message),
            ProcessingError::Cancelled => AppError::Internal(message),
            ProcessingError::Busy(_) => AppError::ServiceBusy(message),
            ProcessingError::Storage(e) => AppError::from(e),
        }
    }
}
