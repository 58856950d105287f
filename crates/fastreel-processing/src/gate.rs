//! Admission gate for external-process work.

use crate::error::{ProcessingError, ProcessingResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Bounds how many requests run ffprobe/ffmpeg, or hold a remuxed file waiting to be
/// stored, at the same time. A request that cannot get a slot within `max_wait` is
/// turned away instead of queueing indefinitely.
#[derive(Debug, Clone)]
pub struct ProcessGate {
    semaphore: Arc<Semaphore>,
    max_wait: Duration,
}

impl ProcessGate {
    pub fn new(max_concurrent: usize, max_wait: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            max_wait,
        }
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a slot. The slot is released when the permit is dropped.
    pub async fn enter(&self) -> ProcessingResult<OwnedSemaphorePermit> {
        match tokio::time::timeout(self.max_wait, self.semaphore.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) | Err(_) => {
                tracing::warn!(
                    max_wait_ms = self.max_wait.as_millis() as u64,
                    "Media processing gate full, rejecting request"
                );
                Err(ProcessingError::Busy(self.max_wait))
            }
        }
    }
}
