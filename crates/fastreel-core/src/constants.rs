//! Shared constants.

/// Separator between bucket and key in a persisted compound locator (`bucket,key`).
pub const LOCATOR_SEPARATOR: char = ',';

/// Multipart field carrying the video file.
pub const VIDEO_FIELD_NAME: &str = "video";

/// Multipart field carrying the thumbnail image.
pub const THUMBNAIL_FIELD_NAME: &str = "thumbnail";

/// Suffix appended to an upload session path to derive the remux output path.
pub const REMUX_OUTPUT_SUFFIX: &str = ".processing";

/// Bytes of randomness in a storage key token (rendered as 64 hex characters).
pub const STORAGE_KEY_TOKEN_BYTES: usize = 32;

/// Prefix for upload session temp files.
pub const UPLOAD_TEMP_PREFIX: &str = "fastreel-upload-";
