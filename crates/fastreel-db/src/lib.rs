//! Fastreel DB Library
//!
//! Persistence for [`VideoAsset`](fastreel_core::VideoAsset) records: the
//! [`AssetRepository`] trait, a PostgreSQL implementation and an in-memory one used
//! when no `DATABASE_URL` is configured and in tests.

pub mod error;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod repository;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::InMemoryAssetRepository;
#[cfg(feature = "postgres")]
pub use postgres::{connect, PgAssetRepository};
pub use repository::AssetRepository;
