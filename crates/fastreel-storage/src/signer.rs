//! Access URL signer: turns a persisted locator into something a client can fetch.

use crate::{Storage, StorageError, StorageResult};
use fastreel_core::StorageLocator;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct UrlSigner {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl UrlSigner {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign a compound locator; resolved locators are returned unchanged.
    ///
    /// A signing failure is an error. The unsigned `bucket,key` form is never handed out.
    pub async fn sign_locator(&self, locator: &StorageLocator) -> StorageResult<String> {
        match locator {
            StorageLocator::Object { bucket, key } => self
                .storage
                .presigned_get_url(bucket, key, self.ttl)
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %bucket,
                        key = %key,
                        "Failed to sign storage locator"
                    );
                    match e {
                        StorageError::SigningFailed(msg) => StorageError::SigningFailed(msg),
                        other => StorageError::SigningFailed(other.to_string()),
                    }
                }),
            StorageLocator::Resolved(raw) => Ok(raw.clone()),
        }
    }

    /// Sign a persisted locator string, if there is one.
    pub async fn sign(&self, raw: Option<&str>) -> StorageResult<Option<String>> {
        match raw {
            Some(raw) => self
                .sign_locator(&StorageLocator::parse(raw))
                .await
                .map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageBackend;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStorage {
        fail: bool,
        signed: Mutex<Vec<(String, String, Duration)>>,
    }

    #[async_trait]
    impl Storage for RecordingStorage {
        async fn put_object(&self, _: &str, _: &str, _: Bytes, _: &str) -> StorageResult<()> {
            Ok(())
        }

        async fn presigned_get_url(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> StorageResult<String> {
            if self.fail {
                return Err(StorageError::BackendError("credentials expired".into()));
            }
            self.signed
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string(), expires_in));
            Ok(format!(
                "https://{}.example.test/{}?expires={}",
                bucket,
                key,
                expires_in.as_secs()
            ))
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::S3
        }
    }

    #[tokio::test]
    async fn compound_locator_is_signed_with_ttl() {
        let storage = Arc::new(RecordingStorage::default());
        let signer = UrlSigner::new(storage.clone(), Duration::from_secs(100));

        let url = signer
            .sign(Some("videos,landscape/abc.mp4"))
            .await
            .unwrap()
            .unwrap();

        assert_ne!(url, "videos,landscape/abc.mp4");
        assert_eq!(
            url,
            "https://videos.example.test/landscape/abc.mp4?expires=100"
        );
        let signed = storage.signed.lock().unwrap();
        assert_eq!(
            signed.as_slice(),
            &[(
                "videos".to_string(),
                "landscape/abc.mp4".to_string(),
                Duration::from_secs(100)
            )]
        );
    }

    #[tokio::test]
    async fn non_compound_locators_pass_through() {
        let storage = Arc::new(RecordingStorage::default());
        let signer = UrlSigner::new(storage.clone(), Duration::from_secs(100));

        for raw in [
            "https://cdn.example.test/a.mp4",
            "a,b,c",
            ",key",
            "bucket,",
            "",
        ] {
            assert_eq!(signer.sign(Some(raw)).await.unwrap().as_deref(), Some(raw));
        }
        assert_eq!(signer.sign(None).await.unwrap(), None);
        assert!(storage.signed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn signing_errors_do_not_fall_back() {
        let storage = Arc::new(RecordingStorage {
            fail: true,
            ..Default::default()
        });
        let signer = UrlSigner::new(storage, Duration::from_secs(100));

        let result = signer.sign(Some("videos,landscape/abc.mp4")).await;
        assert!(matches!(result, Err(StorageError::SigningFailed(_))));
    }
}
