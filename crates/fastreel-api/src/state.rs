//! Application state shared by every handler.

use fastreel_core::Config;
use fastreel_db::AssetRepository;
use fastreel_processing::{ContentTypePolicy, MediaProbe, Remuxer, VideoIngestPipeline};
use fastreel_storage::{LocalStorage, Storage, UrlSigner};
use sqlx::PgPool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Content-type allow-lists and size caps per upload endpoint.
#[derive(Clone)]
pub struct UploadPolicies {
    pub video_types: ContentTypePolicy,
    pub thumbnail_types: ContentTypePolicy,
    pub max_video_size: u64,
    pub max_thumbnail_size: u64,
}

impl UploadPolicies {
    pub fn from_config(config: &Config) -> Self {
        Self {
            video_types: ContentTypePolicy::new(config.media.video_allowed_content_types.clone()),
            thumbnail_types: ContentTypePolicy::new(
                config.media.thumbnail_allowed_content_types.clone(),
            ),
            max_video_size: config.media.max_video_size_bytes as u64,
            max_thumbnail_size: config.media.max_thumbnail_size_bytes as u64,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repository: Arc<dyn AssetRepository>,
    /// Present when running against PostgreSQL; used by the health check.
    pub pool: Option<PgPool>,
    pub storage: Arc<dyn Storage>,
    /// Present when the local backend is active, to verify signed object reads.
    pub local_storage: Option<Arc<LocalStorage>>,
    pub signer: UrlSigner,
    pub pipeline: VideoIngestPipeline,
    pub uploads: UploadPolicies,
    /// Cancelled on shutdown; parent of every request's cancellation token.
    pub shutdown: CancellationToken,
}

/// Everything [`AppState::new`] needs besides configuration.
pub struct StateParts {
    pub repository: Arc<dyn AssetRepository>,
    pub pool: Option<PgPool>,
    pub storage: Arc<dyn Storage>,
    pub local_storage: Option<Arc<LocalStorage>>,
    pub probe: Arc<dyn MediaProbe>,
    pub remuxer: Arc<dyn Remuxer>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: Config, parts: StateParts) -> Self {
        let pipeline = VideoIngestPipeline::from_config(
            &config,
            parts.probe,
            parts.remuxer,
            parts.storage.clone(),
        );
        let signer = UrlSigner::new(parts.storage.clone(), config.presigned_url_ttl());
        let uploads = UploadPolicies::from_config(&config);

        Self {
            config: Arc::new(config),
            repository: parts.repository,
            pool: parts.pool,
            storage: parts.storage,
            local_storage: parts.local_storage,
            signer,
            pipeline,
            uploads,
            shutdown: parts.shutdown,
        }
    }
}
