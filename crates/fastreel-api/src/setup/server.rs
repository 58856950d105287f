//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use fastreel_core::Config;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long in-flight uploads may keep running after a shutdown signal before their
/// external processes are killed.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(30);

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router, shutdown: CancellationToken) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.base.server_port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        max_video_mb = config.media.max_video_size_bytes / 1024 / 1024,
        max_thumbnail_mb = config.media.max_thumbnail_size_bytes / 1024 / 1024,
        video_content_types = %config.media.video_allowed_content_types.join(","),
        thumbnail_content_types = %config.media.thumbnail_allowed_content_types.join(","),
        ffprobe_path = %config.media.ffprobe_path,
        ffmpeg_path = %config.media.ffmpeg_path,
        max_concurrent_media_jobs = config.media.max_concurrent_media_jobs,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    // Anything still running past this point is abandoned.
    shutdown.cancel();
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM. In-flight requests get
/// [`SHUTDOWN_GRACE_PERIOD`] before `shutdown` is cancelled under them.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!(
        grace_period_secs = SHUTDOWN_GRACE_PERIOD.as_secs(),
        "Shutting down gracefully..."
    );

    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = tokio::time::sleep(SHUTDOWN_GRACE_PERIOD) => {
                tracing::warn!("Grace period elapsed, cancelling in-flight media processing");
                shutdown.cancel();
            }
        }
    });
}
