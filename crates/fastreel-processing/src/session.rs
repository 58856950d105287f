//! Scoped temporary files for incoming uploads.
//!
//! The file backing an [`UploadSession`] (and the [`ReceivedFile`] it turns into) is
//! removed when the value is dropped, so every exit path of a request releases it.

use crate::error::{ProcessingError, ProcessingResult};
use crate::validator::ValidatedMediaType;
use fastreel_core::constants::UPLOAD_TEMP_PREFIX;
use std::path::Path;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// An upload being streamed to disk under a size cap.
pub struct UploadSession {
    file: File,
    path: TempPath,
    media_type: ValidatedMediaType,
    size: u64,
    max_size: u64,
}

impl UploadSession {
    /// Create the backing temp file in `dir`.
    pub async fn create(
        dir: &Path,
        media_type: ValidatedMediaType,
        max_size: u64,
    ) -> ProcessingResult<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let named = tempfile::Builder::new()
            .prefix(UPLOAD_TEMP_PREFIX)
            .tempfile_in(dir)?;
        let (file, path) = named.into_parts();

        tracing::debug!(path = %path.display(), "Upload session started");

        Ok(Self {
            file: File::from_std(file),
            path,
            media_type,
            size: 0,
            max_size,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a chunk, failing once the running size exceeds the cap.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> ProcessingResult<()> {
        let size = self.size + chunk.len() as u64;
        if size > self.max_size {
            return Err(ProcessingError::PayloadTooLarge { max: self.max_size });
        }
        self.file.write_all(chunk).await?;
        self.size = size;
        Ok(())
    }

    /// Flush and close the handle. The file itself stays owned by the returned value.
    pub async fn finish(mut self) -> ProcessingResult<ReceivedFile> {
        self.file.flush().await?;
        self.file.sync_all().await?;
        drop(self.file);

        tracing::debug!(
            path = %self.path.display(),
            size_bytes = self.size,
            content_type = %self.media_type.essence(),
            "Upload session complete"
        );

        Ok(ReceivedFile {
            path: self.path,
            media_type: self.media_type,
            size: self.size,
        })
    }
}

/// A fully received upload on local disk.
pub struct ReceivedFile {
    path: TempPath,
    media_type: ValidatedMediaType,
    size: u64,
}

impl ReceivedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &ValidatedMediaType {
        &self.media_type
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
