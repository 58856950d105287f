use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fastreel_core::{AspectClass, Config, StorageLocator, VideoAsset};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::AssetRepository;

/// Connect to PostgreSQL and apply pending migrations.
pub async fn connect(config: &Config, database_url: &str) -> RepositoryResult<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.base.db_max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(database_url)
        .await?;

    tracing::info!(
        max_connections = config.base.db_max_connections,
        "Database connected successfully"
    );

    sqlx::migrate!("../../migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}

#[derive(Debug, FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    video_url: Option<String>,
    thumbnail_url: Option<String>,
    aspect_class: Option<String>,
    content_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VideoRow> for VideoAsset {
    type Error = RepositoryError;

    fn try_from(row: VideoRow) -> Result<Self, Self::Error> {
        let aspect_class = row
            .aspect_class
            .as_deref()
            .map(str::parse::<AspectClass>)
            .transpose()
            .map_err(|message| RepositoryError::Corrupt {
                id: row.id,
                message,
            })?;

        Ok(VideoAsset {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            aspect_class,
            content_type: row.content_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgAssetRepository {
    pool: PgPool,
}

impl PgAssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssetRepository for PgAssetRepository {
    #[tracing::instrument(skip(self, asset), fields(db.table = "videos", db.operation = "insert", video_id = %asset.id))]
    async fn create(&self, asset: &VideoAsset) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO videos
                (id, user_id, title, description, video_url, thumbnail_url,
                 aspect_class, content_type, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(asset.id)
        .bind(asset.user_id)
        .bind(&asset.title)
        .bind(&asset.description)
        .bind(&asset.video_url)
        .bind(&asset.thumbnail_url)
        .bind(asset.aspect_class.map(|a| a.as_str()))
        .bind(&asset.content_type)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> RepositoryResult<Option<VideoAsset>> {
        let row: Option<VideoRow> =
            sqlx::query_as::<Postgres, VideoRow>("SELECT * FROM videos WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(VideoAsset::try_from).transpose()
    }

    #[tracing::instrument(skip(self, locator), fields(db.table = "videos", db.operation = "update", video_id = %id))]
    async fn set_video_location(
        &self,
        id: Uuid,
        locator: &StorageLocator,
        aspect_class: AspectClass,
        content_type: &str,
    ) -> RepositoryResult<Option<VideoAsset>> {
        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            UPDATE videos
            SET video_url = $2, aspect_class = $3, content_type = $4, updated_at = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(locator.to_string())
        .bind(aspect_class.as_str())
        .bind(content_type)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(VideoAsset::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update"))]
    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        url: &str,
    ) -> RepositoryResult<Option<VideoAsset>> {
        let row: Option<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, updated_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        row.map(VideoAsset::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<VideoAsset>> {
        let rows: Vec<VideoRow> = sqlx::query_as::<Postgres, VideoRow>(
            "SELECT * FROM videos WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VideoAsset::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(aspect_class: Option<&str>) -> VideoRow {
        let now = Utc::now();
        VideoRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "demo".to_string(),
            description: None,
            video_url: Some("videos,landscape/ab.mp4".to_string()),
            thumbnail_url: None,
            aspect_class: aspect_class.map(str::to_string),
            content_type: Some("video/mp4".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn row_maps_to_asset() {
        let asset = VideoAsset::try_from(row(Some("landscape"))).unwrap();
        assert_eq!(asset.aspect_class, Some(AspectClass::Landscape));
        assert_eq!(asset.video_url.as_deref(), Some("videos,landscape/ab.mp4"));

        let draft = VideoAsset::try_from(row(None)).unwrap();
        assert_eq!(draft.aspect_class, None);
    }

    #[test]
    fn unknown_aspect_class_is_corrupt() {
        let result = VideoAsset::try_from(row(Some("diagonal")));
        assert!(matches!(result, Err(RepositoryError::Corrupt { .. })));
    }
}
