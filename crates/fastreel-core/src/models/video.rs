use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::aspect::AspectClass;
use super::locator::StorageLocator;

/// A user-owned video record.
///
/// The ingest pipeline only ever rewrites `video_url` (the persisted [`StorageLocator`]),
/// `aspect_class` and `content_type`; everything else belongs to the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoAsset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub aspect_class: Option<AspectClass>,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoAsset {
    /// New draft asset with no media attached yet.
    pub fn new(user_id: Uuid, title: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title,
            description,
            video_url: None,
            thumbnail_url: None,
            aspect_class: None,
            content_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn locator(&self) -> Option<StorageLocator> {
        self.video_url.as_deref().map(StorageLocator::parse)
    }

    /// Record a freshly stored video.
    pub fn attach_video(
        &mut self,
        locator: &StorageLocator,
        aspect_class: AspectClass,
        content_type: String,
    ) {
        self.video_url = Some(locator.to_string());
        self.aspect_class = Some(aspect_class);
        self.content_type = Some(content_type);
        self.updated_at = Utc::now();
    }

    pub fn attach_thumbnail(&mut self, url: String) {
        self.thumbnail_url = Some(url);
        self.updated_at = Utc::now();
    }
}

/// Request body for creating a draft video.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Video as returned to clients. `video_url` is always fetchable: compound locators
/// have been replaced by a signed URL before this is built.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub aspect_class: Option<AspectClass>,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VideoAsset> for VideoResponse {
    fn from(video: VideoAsset) -> Self {
        VideoResponse {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            aspect_class: video.aspect_class,
            content_type: video.content_type,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}
