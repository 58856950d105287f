//! Storage setup and initialization

use anyhow::{Context, Result};
use fastreel_core::{Config, StorageBackend};
use fastreel_storage::factory::create_local_storage;
use fastreel_storage::{create_storage, LocalStorage, Storage};
use std::sync::Arc;

/// Build the configured backend. The local backend is also returned as its concrete type
/// so the object route can verify signed reads.
pub async fn setup_storage(
    config: &Config,
) -> Result<(Arc<dyn Storage>, Option<Arc<LocalStorage>>)> {
    tracing::info!("Initializing storage abstraction...");

    let (storage, local): (Arc<dyn Storage>, Option<Arc<LocalStorage>>) =
        match config.storage.backend {
            StorageBackend::Local => {
                let local = Arc::new(
                    create_local_storage(config)
                        .await
                        .context("Failed to initialize local storage")?,
                );
                (local.clone() as Arc<dyn Storage>, Some(local))
            }
            StorageBackend::S3 => (
                create_storage(config)
                    .await
                    .context("Failed to initialize S3 storage")?,
                None,
            ),
        };

    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %config.upload_bucket(),
        presigned_url_ttl_secs = config.storage.presigned_url_ttl_secs,
        "Storage abstraction initialized successfully"
    );

    Ok((storage, local))
}
