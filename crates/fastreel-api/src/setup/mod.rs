//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded [`Config`] to a ready router.

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::{AppState, StateParts};
use anyhow::{Context, Result};
use fastreel_core::Config;
use fastreel_processing::{FfmpegRemuxer, FfprobeProbe};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Initialize the entire application
pub async fn initialize_app(
    config: Config,
    shutdown: CancellationToken,
) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(&config.base.log_format)
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.base.environment,
        "Configuration loaded and validated successfully"
    );
    crate::error::set_hide_error_details(config.is_production());

    let (repository, pool) = database::setup_database(&config).await?;
    let (storage, local_storage) = storage::setup_storage(&config).await?;

    let probe = Arc::new(FfprobeProbe::new(
        config.media.ffprobe_path.clone(),
        config.probe_timeout(),
    ));
    let remuxer = Arc::new(FfmpegRemuxer::new(
        config.media.ffmpeg_path.clone(),
        config.remux_timeout(),
    ));

    let state = Arc::new(AppState::new(
        config,
        StateParts {
            repository,
            pool,
            storage,
            local_storage,
            probe,
            remuxer,
            shutdown,
        },
    ));

    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}
