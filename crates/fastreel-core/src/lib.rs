//! Fastreel Core Library
//!
//! This crate provides the domain models, error types and configuration shared by
//! every fastreel component: the storage backends, the ingest pipeline, the asset
//! repository and the HTTP API.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, MediaConfig, StorageConfig};
pub use error::{AppError, ErrorKind, ErrorMetadata, LogLevel};
pub use models::{AspectClass, StorageLocator, VideoAsset};
pub use storage_types::StorageBackend;
