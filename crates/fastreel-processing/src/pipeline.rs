//! Video ingest pipeline: classify → remux → key → store.
//!
//! Runs inside the request task. Each stage aborts the rest on failure; nothing already
//! done is compensated. A gate slot is held from probe through the final PUT, so the
//! gate also bounds how many remuxed files are buffered in memory. The received upload
//! and the remux output are scoped temp files, so both are gone once the request
//! finishes either way.

use bytes::Bytes;
use fastreel_core::{AspectClass, Config, StorageLocator};
use fastreel_storage::{build_storage_key, RetryPolicy, Storage};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::{ProcessingError, ProcessingResult};
use crate::gate::ProcessGate;
use crate::probe::{classify_report, MediaProbe};
use crate::remux::Remuxer;
use crate::session::ReceivedFile;

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub locator: StorageLocator,
    pub aspect: AspectClass,
    pub key: String,
    pub size_bytes: u64,
}

#[derive(Clone)]
pub struct VideoIngestPipeline {
    probe: Arc<dyn MediaProbe>,
    remuxer: Arc<dyn Remuxer>,
    storage: Arc<dyn Storage>,
    gate: ProcessGate,
    retry: RetryPolicy,
    bucket: String,
}

impl VideoIngestPipeline {
    pub fn new(
        probe: Arc<dyn MediaProbe>,
        remuxer: Arc<dyn Remuxer>,
        storage: Arc<dyn Storage>,
        gate: ProcessGate,
        retry: RetryPolicy,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            probe,
            remuxer,
            storage,
            gate,
            retry,
            bucket: bucket.into(),
        }
    }

    /// Pipeline with gate, retry policy and bucket taken from configuration.
    pub fn from_config(
        config: &Config,
        probe: Arc<dyn MediaProbe>,
        remuxer: Arc<dyn Remuxer>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self::new(
            probe,
            remuxer,
            storage,
            ProcessGate::new(
                config.media.max_concurrent_media_jobs,
                config.media_job_queue_timeout(),
            ),
            RetryPolicy::from_config(config),
            config.upload_bucket(),
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Free admission gate slots right now.
    pub fn available_slots(&self) -> usize {
        self.gate.available()
    }

    #[tracing::instrument(
        skip(self, upload, cancel),
        fields(size_bytes = upload.size(), content_type = %upload.media_type().essence())
    )]
    pub async fn ingest(
        &self,
        upload: &ReceivedFile,
        cancel: &CancellationToken,
    ) -> ProcessingResult<IngestOutcome> {
        let start = std::time::Instant::now();

        let permit = self.gate.enter().await?;

        let report = self.probe.probe(upload.path(), cancel).await?;
        let aspect = classify_report(&report)?;
        tracing::debug!(aspect = %aspect, "Video classified");

        let remuxed = self.remuxer.remux(upload.path(), cancel).await?;

        let key = build_storage_key(aspect, upload.media_type().extension());
        let data = Bytes::from(tokio::fs::read(&remuxed).await?);
        let size_bytes = data.len() as u64;
        drop(remuxed);

        // The buffered object counts against the gate until the PUT is done.
        self.store(&key, data, upload.media_type().essence(), cancel)
            .await?;
        drop(permit);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            aspect = %aspect,
            size_bytes = size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Video ingested"
        );

        Ok(IngestOutcome {
            locator: StorageLocator::object(self.bucket.clone(), key.clone()),
            aspect,
            key,
            size_bytes,
        })
    }

    async fn store(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        cancel: &CancellationToken,
    ) -> ProcessingResult<()> {
        let storage = &self.storage;
        let bucket = self.bucket.as_str();
        let data = &data;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ProcessingError::Cancelled),
            result = self.retry.run("put_object", move || {
                storage.put_object(bucket, key, data.clone(), content_type)
            }) => result.map_err(ProcessingError::from),
        }
    }
}
