//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use fastreel_core::AppError;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Storage request rejected: {0}")]
    Rejected(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("URL signing failed: {0}")]
    SigningFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// Whether another attempt of the same operation may succeed.
    ///
    /// Authentication, permission, key and configuration problems are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::BackendError(_)
                | StorageError::Timeout(_)
                | StorageError::IoError(_)
        )
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SigningFailed(msg) => AppError::SigningFailed(msg),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait. Objects are
/// addressed by bucket and key; nothing is publicly readable, so reads go through a
/// time-bounded signed URL.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` under `bucket`/`key` with a single PUT.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Issue a GET URL for `bucket`/`key` that stays valid for `expires_in`.
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastreel_core::ErrorMetadata;

    #[test]
    fn terminal_errors_are_not_retried() {
        assert!(StorageError::UploadFailed("503".into()).is_retryable());
        assert!(StorageError::Timeout(Duration::from_secs(1)).is_retryable());
        assert!(!StorageError::Rejected("403".into()).is_retryable());
        assert!(!StorageError::InvalidKey("..".into()).is_retryable());
        assert!(!StorageError::ConfigError("no bucket".into()).is_retryable());
        assert!(!StorageError::SigningFailed("no creds".into()).is_retryable());
    }

    #[test]
    fn signing_failures_keep_their_own_code() {
        let app: AppError = StorageError::SigningFailed("no creds".into()).into();
        assert_eq!(app.error_code(), "SIGNING_FAILED");

        let app: AppError = StorageError::UploadFailed("reset".into()).into();
        assert_eq!(app.error_code(), "STORAGE_ERROR");
    }
}
