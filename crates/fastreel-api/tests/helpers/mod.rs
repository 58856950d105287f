//! Test helpers: build AppState and router for integration tests.
//!
//! External tools and object storage are replaced by in-process fakes so the full HTTP
//! path runs without ffprobe, ffmpeg, S3 or PostgreSQL.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use fastreel_api::auth::JwtClaims;
use fastreel_api::setup::routes;
use fastreel_api::{AppState, StateParts};
use fastreel_core::{Config, StorageBackend};
use fastreel_core::{AspectClass, StorageLocator, VideoAsset};
use fastreel_db::{AssetRepository, InMemoryAssetRepository, RepositoryError, RepositoryResult};
use fastreel_processing::remux::remux_output_path;
use fastreel_processing::{
    MediaProbe, ProbeReport, ProbeStream, ProcessingError, ProcessingResult, Remuxer,
};
use fastreel_storage::{LocalStorage, Storage, StorageError, StorageResult};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{TempDir, TempPath};
use tokio::sync::{Notify, Semaphore};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_BUCKET: &str = "videos";
pub const SIGNED_URL_BASE: &str = "https://signed.example.com";
pub const PUBLIC_BASE_URL: &str = "http://localhost:8091";

/// Probe that reports fixed geometry and counts its invocations.
pub struct FakeProbe {
    report: ProbeReport,
    pub calls: AtomicUsize,
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn probe(&self, _: &Path, _: &CancellationToken) -> ProcessingResult<ProbeReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.report.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemuxMode {
    /// Copy the input to the `.processing` sibling.
    #[default]
    Copy,
    /// Fail the way ffmpeg does on a broken container, writing nothing.
    Fail,
    /// Signal `entered`, then wait for a `release` permit before copying.
    Gated,
}

/// Remuxer fake driven by [`RemuxMode`].
pub struct FakeRemuxer {
    mode: RemuxMode,
    pub calls: AtomicUsize,
    pub entered: Notify,
    pub release: Semaphore,
}

impl FakeRemuxer {
    fn new(mode: RemuxMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl Remuxer for FakeRemuxer {
    async fn remux(&self, input: &Path, _: &CancellationToken) -> ProcessingResult<TempPath> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            RemuxMode::Copy => {}
            RemuxMode::Fail => {
                return Err(ProcessingError::RemuxFailed(
                    "moov atom not found".to_string(),
                ))
            }
            RemuxMode::Gated => {
                self.entered.notify_one();
                self.release.acquire().await.unwrap().forget();
            }
        }
        let output = remux_output_path(input);
        tokio::fs::copy(input, &output).await?;
        Ok(TempPath::from_path(output))
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub data: Bytes,
    pub content_type: String,
}

/// Object store kept in memory. Signed URLs are deterministic and carry the TTL.
#[derive(Default)]
pub struct MemoryStorage {
    pub objects: Mutex<Vec<StoredObject>>,
    pub put_attempts: AtomicUsize,
    /// Every PUT fails with a retryable error.
    pub fail_puts: bool,
    pub fail_signing: bool,
}

impl MemoryStorage {
    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }

    pub fn put_attempts(&self) -> usize {
        self.put_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        self.put_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts {
            return Err(StorageError::UploadFailed("connection reset by peer".to_string()));
        }
        self.objects.lock().unwrap().push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.fail_signing {
            return Err(StorageError::SigningFailed("credentials expired".to_string()));
        }
        Ok(format!(
            "{}/{}/{}?expires_in={}",
            SIGNED_URL_BASE,
            bucket,
            key,
            expires_in.as_secs()
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// In-memory repository whose column writes can be switched to fail.
#[derive(Default)]
pub struct TestRepository {
    inner: InMemoryAssetRepository,
    pub fail_writes: AtomicBool,
}

impl TestRepository {
    fn check_writable(&self) -> RepositoryResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl AssetRepository for TestRepository {
    async fn create(&self, asset: &VideoAsset) -> RepositoryResult<()> {
        self.inner.create(asset).await
    }

    async fn get(&self, id: Uuid) -> RepositoryResult<Option<VideoAsset>> {
        self.inner.get(id).await
    }

    async fn set_video_location(
        &self,
        id: Uuid,
        locator: &StorageLocator,
        aspect_class: AspectClass,
        content_type: &str,
    ) -> RepositoryResult<Option<VideoAsset>> {
        self.check_writable()?;
        self.inner
            .set_video_location(id, locator, aspect_class, content_type)
            .await
    }

    async fn set_thumbnail_url(
        &self,
        id: Uuid,
        url: &str,
    ) -> RepositoryResult<Option<VideoAsset>> {
        self.check_writable()?;
        self.inner.set_thumbnail_url(id, url).await
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<VideoAsset>> {
        self.inner.list_by_user(user_id, limit, offset).await
    }
}

pub struct TestOptions {
    pub env: Vec<(&'static str, String)>,
    pub report: ProbeReport,
    pub remux: RemuxMode,
    pub fail_puts: bool,
    pub fail_signing: bool,
    /// Use the real local backend instead of [`MemoryStorage`].
    pub local_storage: bool,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            env: Vec::new(),
            report: probe_report(1920, 1080),
            remux: RemuxMode::Copy,
            fail_puts: false,
            fail_signing: false,
            local_storage: false,
        }
    }
}

pub fn probe_report(width: u32, height: u32) -> ProbeReport {
    ProbeReport {
        streams: vec![ProbeStream {
            width: Some(width),
            height: Some(height),
        }],
    }
}

/// Test application: server, fakes, and the directory everything is written under.
pub struct TestApp {
    pub server: TestServer,
    pub repository: Arc<TestRepository>,
    pub probe: Arc<FakeProbe>,
    pub remuxer: Arc<FakeRemuxer>,
    pub storage: Arc<MemoryStorage>,
    pub local_storage: Option<Arc<LocalStorage>>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.temp_dir.path().join("uploads")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.temp_dir.path().join("assets")
    }

    pub fn probe_calls(&self) -> usize {
        self.probe.calls.load(Ordering::SeqCst)
    }

    pub fn remux_calls(&self) -> usize {
        self.remuxer.calls.load(Ordering::SeqCst)
    }

    /// True when no upload session file is left behind.
    pub fn upload_dir_is_empty(&self) -> bool {
        match std::fs::read_dir(self.upload_dir()) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }

    /// Create a draft video owned by `user_id` through the API.
    pub async fn create_video(&self, user_id: Uuid) -> Uuid {
        let response = self
            .server
            .post("/api/videos")
            .add_header("Authorization", bearer(user_id))
            .json(&serde_json::json!({ "title": "Launch teaser" }))
            .await;
        assert_eq!(response.status_code(), 201);
        let body: serde_json::Value = response.json();
        body["id"].as_str().unwrap().parse().unwrap()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestOptions::default()).await
}

pub async fn setup_test_app_with(options: TestOptions) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut env: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", TEST_JWT_SECRET.to_string()),
        ("S3_BUCKET", TEST_BUCKET.to_string()),
        ("S3_REGION", "us-east-1".to_string()),
        ("PUBLIC_BASE_URL", PUBLIC_BASE_URL.to_string()),
        (
            "UPLOAD_TEMP_DIR",
            temp_dir.path().join("uploads").display().to_string(),
        ),
        (
            "ASSETS_ROOT",
            temp_dir.path().join("assets").display().to_string(),
        ),
    ]);
    if options.local_storage {
        env.insert("STORAGE_BACKEND", "local".to_string());
        env.insert(
            "LOCAL_STORAGE_PATH",
            temp_dir.path().join("objects").display().to_string(),
        );
        env.insert(
            "LOCAL_STORAGE_BASE_URL",
            format!("{}/objects", PUBLIC_BASE_URL),
        );
    }
    env.extend(options.env);

    let config = Config::from_lookup(|key| env.get(key).cloned()).expect("Invalid test config");

    let repository = Arc::new(TestRepository::default());
    let probe = Arc::new(FakeProbe {
        report: options.report,
        calls: AtomicUsize::new(0),
    });
    let remuxer = Arc::new(FakeRemuxer::new(options.remux));
    let storage = Arc::new(MemoryStorage {
        fail_puts: options.fail_puts,
        fail_signing: options.fail_signing,
        ..Default::default()
    });

    let local_storage = if options.local_storage {
        Some(Arc::new(
            fastreel_storage::factory::create_local_storage(&config)
                .await
                .expect("Failed to create local storage"),
        ))
    } else {
        None
    };
    let active_storage: Arc<dyn Storage> = match local_storage {
        Some(ref local) => local.clone(),
        None => storage.clone(),
    };

    let state = Arc::new(AppState::new(
        config,
        StateParts {
            repository: repository.clone(),
            pool: None,
            storage: active_storage,
            local_storage: local_storage.clone(),
            probe: probe.clone(),
            remuxer: remuxer.clone(),
            shutdown: CancellationToken::new(),
        },
    ));
    let router = routes::setup_routes(&state.config, state.clone()).expect("Failed to build routes");

    TestApp {
        server: TestServer::new(router).expect("Failed to start test server"),
        repository,
        probe,
        remuxer,
        storage,
        local_storage,
        temp_dir,
    }
}

/// Mint an HS256 token for `user_id` signed with the test secret.
pub fn token_for(user_id: Uuid) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id,
        exp: now + 3600,
        iat: now,
        nbf: None,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode token")
}

pub fn bearer(user_id: Uuid) -> String {
    format!("Bearer {}", token_for(user_id))
}

/// Minimal MP4 (ftyp + mdat).
pub fn create_test_video() -> Vec<u8> {
    let mut mp4 = Vec::new();
    mp4.extend_from_slice(&[0x00, 0x00, 0x00, 0x20]);
    mp4.extend_from_slice(b"ftyp");
    mp4.extend_from_slice(b"isom");
    mp4.extend_from_slice(&[0x00, 0x00, 0x02, 0x00]);
    mp4.extend_from_slice(b"isomiso2mp41");
    mp4.extend_from_slice(&[0x00, 0x00, 0x00, 0x08]);
    mp4.extend_from_slice(b"mdat");
    mp4
}

/// Minimal valid 1x1 PNG bytes.
pub fn create_minimal_png() -> Vec<u8> {
    vec![
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
        0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x18, 0xDD, 0x8D, 0x89, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ]
}

/// Multipart body with one file part.
pub fn file_form(field: &str, data: Vec<u8>, file_name: &str, mime_type: &str) -> MultipartForm {
    let part = Part::bytes(Bytes::from(data))
        .file_name(file_name.to_string())
        .mime_type(mime_type.to_string());
    MultipartForm::new().add_part(field.to_string(), part)
}
