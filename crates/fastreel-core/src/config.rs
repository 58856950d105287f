//! Configuration module
//!
//! Configuration is read once at startup from the environment (optionally seeded from a
//! `.env` file) and passed by reference into every pipeline stage. Nothing in the
//! workspace reads process-wide configuration after `Config::from_env` returns.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 8091;
const DB_MAX_CONNECTIONS: u32 = 10;
const PRESIGNED_URL_TTL_SECS: u64 = 100;
const MAX_VIDEO_SIZE_BYTES: usize = 1 << 30;
const MAX_THUMBNAIL_SIZE_BYTES: usize = 10 << 20;
const PROBE_TIMEOUT_SECS: u64 = 30;
const REMUX_TIMEOUT_SECS: u64 = 300;
const STORAGE_TIMEOUT_SECS: u64 = 120;
const STORAGE_MAX_RETRIES: u32 = 3;
const STORAGE_RETRY_BASE_DELAY_MS: u64 = 200;
const MAX_CONCURRENT_MEDIA_JOBS: usize = 4;
const MEDIA_JOB_QUEUE_TIMEOUT_SECS: u64 = 30;
const LOCAL_STORAGE_BUCKET: &str = "fastreel";
const MIN_SECRET_LEN: usize = 32;

/// Server, auth and persistence settings.
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub public_base_url: String,
    /// PostgreSQL connection string. When unset the API runs on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub log_format: String,
}

/// Object storage settings.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_storage_bucket: String,
    pub url_signing_secret: String,
    pub presigned_url_ttl_secs: u64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

/// Upload limits, allow-lists and external tool settings.
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub thumbnail_allowed_content_types: Vec<String>,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub probe_timeout_secs: u64,
    pub remux_timeout_secs: u64,
    pub max_concurrent_media_jobs: usize,
    pub media_job_queue_timeout_secs: u64,
    pub upload_temp_dir: PathBuf,
    pub assets_root: PathBuf,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub media: MediaConfig,
}

/// Parse `key`. Unset or blank means `default`; anything unparsable is an error.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {:?} ({})", key, raw, e)),
        None => Ok(default),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn parse_list(value: Option<String>, default: &[&str]) -> Vec<String> {
    let list: Vec<String> = value
        .map(|s| {
            s.split(',')
                .map(|item| item.trim().to_lowercase())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if list.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        list
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_port = parse_or(&lookup, "SERVER_PORT", SERVER_PORT)?;
        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();

        let backend = match non_empty(lookup("STORAGE_BACKEND")) {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let config = Config {
            base: BaseConfig {
                server_port,
                environment: lookup("ENVIRONMENT")
                    .or_else(|| lookup("APP_ENV"))
                    .unwrap_or_else(|| "development".to_string()),
                jwt_secret: jwt_secret.clone(),
                cors_origins: lookup("CORS_ORIGINS")
                    .unwrap_or_else(|| "*".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                public_base_url: non_empty(lookup("PUBLIC_BASE_URL"))
                    .map(|s| s.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| format!("http://localhost:{}", server_port)),
                database_url: non_empty(lookup("DATABASE_URL")),
                db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS)?,
                log_format: lookup("LOG_FORMAT")
                    .unwrap_or_else(|| "compact".to_string())
                    .to_lowercase(),
            },
            storage: StorageConfig {
                backend,
                s3_bucket: non_empty(lookup("S3_BUCKET")),
                s3_region: non_empty(lookup("S3_REGION")),
                s3_endpoint: non_empty(lookup("S3_ENDPOINT")),
                aws_region: non_empty(lookup("AWS_REGION")),
                local_storage_path: non_empty(lookup("LOCAL_STORAGE_PATH")),
                local_storage_base_url: non_empty(lookup("LOCAL_STORAGE_BASE_URL")),
                local_storage_bucket: non_empty(lookup("LOCAL_STORAGE_BUCKET"))
                    .unwrap_or_else(|| LOCAL_STORAGE_BUCKET.to_string()),
                url_signing_secret: non_empty(lookup("URL_SIGNING_SECRET"))
                    .unwrap_or(jwt_secret),
                presigned_url_ttl_secs: parse_or(
                    &lookup,
                    "PRESIGNED_URL_TTL_SECS",
                    PRESIGNED_URL_TTL_SECS,
                )?,
                timeout_secs: parse_or(&lookup, "STORAGE_TIMEOUT_SECS", STORAGE_TIMEOUT_SECS)?,
                max_retries: parse_or(&lookup, "STORAGE_MAX_RETRIES", STORAGE_MAX_RETRIES)?,
                retry_base_delay_ms: parse_or(
                    &lookup,
                    "STORAGE_RETRY_BASE_DELAY_MS",
                    STORAGE_RETRY_BASE_DELAY_MS,
                )?,
            },
            media: MediaConfig {
                max_video_size_bytes: parse_or(
                    &lookup,
                    "MAX_VIDEO_SIZE_BYTES",
                    MAX_VIDEO_SIZE_BYTES,
                )?,
                max_thumbnail_size_bytes: parse_or(
                    &lookup,
                    "MAX_THUMBNAIL_SIZE_BYTES",
                    MAX_THUMBNAIL_SIZE_BYTES,
                )?,
                video_allowed_content_types: parse_list(
                    lookup("VIDEO_ALLOWED_CONTENT_TYPES"),
                    &["video/mp4"],
                ),
                thumbnail_allowed_content_types: parse_list(
                    lookup("THUMBNAIL_ALLOWED_CONTENT_TYPES"),
                    &["image/jpeg", "image/png"],
                ),
                ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
                ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
                probe_timeout_secs: parse_or(&lookup, "PROBE_TIMEOUT_SECS", PROBE_TIMEOUT_SECS)?,
                remux_timeout_secs: parse_or(&lookup, "REMUX_TIMEOUT_SECS", REMUX_TIMEOUT_SECS)?,
                max_concurrent_media_jobs: parse_or(
                    &lookup,
                    "MAX_CONCURRENT_MEDIA_JOBS",
                    MAX_CONCURRENT_MEDIA_JOBS,
                )?,
                media_job_queue_timeout_secs: parse_or(
                    &lookup,
                    "MEDIA_JOB_QUEUE_TIMEOUT_SECS",
                    MEDIA_JOB_QUEUE_TIMEOUT_SECS,
                )?,
                upload_temp_dir: non_empty(lookup("UPLOAD_TEMP_DIR"))
                    .map(PathBuf::from)
                    .unwrap_or_else(env::temp_dir),
                assets_root: PathBuf::from(
                    non_empty(lookup("ASSETS_ROOT")).unwrap_or_else(|| "./assets".to_string()),
                ),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_SECRET_LEN
            ));
        }

        if self.storage.url_signing_secret.len() < MIN_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "URL_SIGNING_SECRET must be at least {} characters long",
                MIN_SECRET_LEN
            ));
        }

        if let Some(ref url) = self.base.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.storage.presigned_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PRESIGNED_URL_TTL_SECS must be greater than 0"));
        }

        if self.storage.timeout_secs == 0 {
            return Err(anyhow::anyhow!("STORAGE_TIMEOUT_SECS must be greater than 0"));
        }

        if self.media.max_concurrent_media_jobs == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_MEDIA_JOBS must be greater than 0"
            ));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.s3_region.is_none() && self.storage.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Bucket that uploads are written to for the active backend.
    pub fn upload_bucket(&self) -> &str {
        match self.storage.backend {
            StorageBackend::S3 => self.storage.s3_bucket.as_deref().unwrap_or_default(),
            StorageBackend::Local => &self.storage.local_storage_bucket,
        }
    }

    /// Region for the S3 backend, preferring `S3_REGION` over `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.storage
            .s3_region
            .as_deref()
            .or(self.storage.aws_region.as_deref())
    }

    pub fn presigned_url_ttl(&self) -> Duration {
        Duration::from_secs(self.storage.presigned_url_ttl_secs)
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage.timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.media.probe_timeout_secs)
    }

    pub fn remux_timeout(&self) -> Duration {
        Duration::from_secs(self.media.remux_timeout_secs)
    }

    pub fn media_job_queue_timeout(&self) -> Duration {
        Duration::from_secs(self.media.media_job_queue_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_for_s3_backend() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "videos"),
            ("AWS_REGION", "us-east-1"),
        ]))
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.upload_bucket(), "videos");
        assert_eq!(config.s3_region(), Some("us-east-1"));
        assert_eq!(config.presigned_url_ttl(), Duration::from_secs(100));
        assert_eq!(config.media.video_allowed_content_types, vec!["video/mp4"]);
        assert_eq!(
            config.media.thumbnail_allowed_content_types,
            vec!["image/jpeg", "image/png"]
        );
        assert_eq!(config.media.max_video_size_bytes, 1 << 30);
        assert_eq!(config.storage.url_signing_secret, SECRET);
        assert_eq!(config.base.public_base_url, "http://localhost:8091");
        assert!(config.base.database_url.is_none());
    }

    #[test]
    fn rejects_short_jwt_secret() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "short"),
            ("S3_BUCKET", "videos"),
            ("AWS_REGION", "us-east-1"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn s3_backend_requires_bucket() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("AWS_REGION", "us-east-1"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));
    }

    #[test]
    fn local_backend_uses_local_bucket() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/fastreel"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:8091/objects"),
            ("PRESIGNED_URL_TTL_SECS", "3600"),
        ]))
        .unwrap();
        assert_eq!(config.upload_bucket(), "fastreel");
        assert_eq!(config.presigned_url_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn allow_lists_are_normalized() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "videos"),
            ("S3_REGION", "eu-west-1"),
            ("VIDEO_ALLOWED_CONTENT_TYPES", " Video/MP4 , video/quicktime ,"),
        ]))
        .unwrap();
        assert_eq!(
            config.media.video_allowed_content_types,
            vec!["video/mp4", "video/quicktime"]
        );
    }

    #[test]
    fn rejects_zero_ttl() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "videos"),
            ("S3_REGION", "eu-west-1"),
            ("PRESIGNED_URL_TTL_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PRESIGNED_URL_TTL_SECS"));
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "videos"),
            ("S3_REGION", "eu-west-1"),
            ("PRESIGNED_URL_TTL_SECS", "1OO"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PRESIGNED_URL_TTL_SECS"));

        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "videos"),
            ("S3_REGION", "eu-west-1"),
            ("MAX_VIDEO_SIZE_BYTES", "-1"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("MAX_VIDEO_SIZE_BYTES"));
    }

    #[test]
    fn blank_numbers_use_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "videos"),
            ("S3_REGION", "eu-west-1"),
            ("SERVER_PORT", "  "),
        ]))
        .unwrap();
        assert_eq!(config.base.server_port, 8091);
    }

    #[test]
    fn rejects_zero_storage_timeout() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("S3_BUCKET", "videos"),
            ("S3_REGION", "eu-west-1"),
            ("STORAGE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("STORAGE_TIMEOUT_SECS"));
    }
}
