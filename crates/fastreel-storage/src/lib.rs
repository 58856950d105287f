//! Fastreel Storage Library
//!
//! Object storage for processed videos: the `Storage` trait with S3 and local filesystem
//! backends, the storage key builder, retry with backoff for uploads, and the access URL
//! signer used when a stored locator is read back.
//!
//! # Storage key format
//!
//! Keys are `{aspect_class}/{token}.{extension}` where the token is 32 random bytes
//! rendered as 64 lowercase hex characters. Keys never contain `..` or a leading `/`.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod retry;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signer;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use fastreel_core::StorageBackend;
pub use keys::build_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use retry::RetryPolicy;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signer::UrlSigner;
pub use traits::{Storage, StorageError, StorageResult};
