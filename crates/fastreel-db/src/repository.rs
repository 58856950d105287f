use async_trait::async_trait;
use fastreel_core::{AspectClass, StorageLocator, VideoAsset};
use uuid::Uuid;

use crate::error::RepositoryResult;

/// Record store for video assets, keyed by asset id.
///
/// Writes are column-scoped: each one touches only the fields it names, so an upload
/// finishing late never reverts a change committed while it ran. Two writes to the
/// same columns are not coordinated and the last one wins.
#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn create(&self, asset: &VideoAsset) -> RepositoryResult<()>;

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<VideoAsset>>;

    /// Set `video_url`, `aspect_class` and `content_type`. Returns the updated record,
    /// or `None` when no record with `id` exists.
    async fn set_video_location(
        &self,
        id: Uuid,
        locator: &StorageLocator,
        aspect_class: AspectClass,
        content_type: &str,
    ) -> RepositoryResult<Option<VideoAsset>>;

    /// Set `thumbnail_url`. Returns the updated record, or `None` when it does not exist.
    async fn set_thumbnail_url(&self, id: Uuid, url: &str)
        -> RepositoryResult<Option<VideoAsset>>;

    /// Newest first.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<VideoAsset>>;
}
