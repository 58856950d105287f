use fastreel_core::AppError;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[cfg(feature = "postgres")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "postgres")]
    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Corrupt record {id}: {message}")]
    Corrupt { id: uuid::Uuid, message: String },
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Persistence(err.to_string())
    }
}
