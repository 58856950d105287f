use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::constants::LOCATOR_SEPARATOR;

/// Where a stored video lives, as persisted on the asset record.
///
/// The persisted form is a single string: `"<bucket>,<key>"` for a private object that
/// needs a signed URL before it can be fetched, or any other string (usually an absolute
/// URL) that is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocator {
    Object { bucket: String, key: String },
    Resolved(String),
}

impl StorageLocator {
    pub fn object(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        StorageLocator::Object {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse a persisted locator. Exactly one separator with non-empty text on both
    /// sides makes a compound locator; anything else is opaque.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split(LOCATOR_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(bucket), Some(key), None) if !bucket.is_empty() && !key.is_empty() => {
                StorageLocator::object(bucket, key)
            }
            _ => StorageLocator::Resolved(raw.to_string()),
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, StorageLocator::Object { .. })
    }

    /// Bucket and key of a compound locator.
    pub fn as_object(&self) -> Option<(&str, &str)> {
        match self {
            StorageLocator::Object { bucket, key } => Some((bucket, key)),
            StorageLocator::Resolved(_) => None,
        }
    }
}

impl Display for StorageLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageLocator::Object { bucket, key } => {
                write!(f, "{}{}{}", bucket, LOCATOR_SEPARATOR, key)
            }
            StorageLocator::Resolved(raw) => f.write_str(raw),
        }
    }
}
