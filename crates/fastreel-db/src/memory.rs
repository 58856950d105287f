use async_trait::async_trait;
use fastreel_core::{AspectClass, StorageLocator, VideoAsset};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RepositoryResult;
use crate::repository::AssetRepository;

/// Process-local repository. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryAssetRepository {
    assets: RwLock<HashMap<Uuid, VideoAsset>>,
}

impl InMemoryAssetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetRepository for InMemoryAssetRepository {
    async fn create(&self, asset: &VideoAsset) -> RepositoryResult<()> {
        self.assets.write().await.insert(asset.id, asset.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<VideoAsset>> {
        Ok(self.assets.read().await.get(&id).cloned())
    }

    async fn set_video_location(
        &self,
        id: Uuid,
        locator: &StorageLocator,
        aspect_class: AspectClass,
        content_type: &str,
    ) -> RepositoryResult<Option<VideoAsset>> {
        let mut assets = self.assets.write().await;
        Ok(assets.get_mut(&id).map(|existing| {
            existing.attach_video(locator, aspect_class, content_type.to_string());
            existing.clone()
        }))
    }

    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        url: &str,
    ) -> RepositoryResult<Option<VideoAsset>> {
        let mut assets = self.assets.write().await;
        Ok(assets.get_mut(&id).map(|existing| {
            existing.attach_thumbnail(url.to_string());
            existing.clone()
        }))
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<VideoAsset>> {
        let assets = self.assets.read().await;
        let mut owned: Vec<VideoAsset> = assets
            .values()
            .filter(|asset| asset.is_owned_by(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(owned
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}
