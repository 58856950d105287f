//! Database setup and initialization

use anyhow::{Context, Result};
use fastreel_core::Config;
use fastreel_db::{AssetRepository, InMemoryAssetRepository, PgAssetRepository};
use sqlx::PgPool;
use std::sync::Arc;

/// Connect to PostgreSQL and run migrations, or fall back to the in-memory store when
/// `DATABASE_URL` is unset.
pub async fn setup_database(
    config: &Config,
) -> Result<(Arc<dyn AssetRepository>, Option<PgPool>)> {
    match config.base.database_url.as_deref() {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = fastreel_db::connect(config, database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!(
                max_connections = config.base.db_max_connections,
                "Database connected and migrations applied"
            );
            Ok((Arc::new(PgAssetRepository::new(pool.clone())), Some(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, video records are kept in memory only");
            Ok((Arc::new(InMemoryAssetRepository::new()), None))
        }
    }
}
