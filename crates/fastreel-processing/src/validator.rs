use crate::error::{ProcessingError, ProcessingResult};

/// A declared MIME type that passed an allow-list, reduced to its essence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedMediaType {
    essence: String,
    subtype: String,
}

impl ValidatedMediaType {
    /// Base type without parameters, lowercase (e.g. `video/mp4`).
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// File extension for stored objects, taken from the subtype (`mp4`, `jpeg`, `png`).
    pub fn extension(&self) -> &str {
        &self.subtype
    }
}

/// Exact-match allow-list for declared content types, one per upload endpoint.
#[derive(Debug, Clone)]
pub struct ContentTypePolicy {
    allowed: Vec<String>,
}

impl ContentTypePolicy {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed: allowed.into_iter().map(|ct| ct.to_lowercase()).collect(),
        }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Validate a declared content type.
    ///
    /// Parameters (`; codecs=...`) are discarded before matching. A missing or malformed
    /// value is rejected the same way as a well-formed type outside the list.
    pub fn validate(&self, declared: Option<&str>) -> ProcessingResult<ValidatedMediaType> {
        let declared = declared.unwrap_or_default();
        let reject = || ProcessingError::UnsupportedMediaType {
            content_type: declared.to_string(),
            allowed: self.allowed.clone(),
        };

        let media_type = parse_media_type(declared).ok_or_else(reject)?;
        if !self.allowed.iter().any(|ct| *ct == media_type.essence) {
            return Err(reject());
        }

        Ok(media_type)
    }
}

fn parse_media_type(raw: &str) -> Option<ValidatedMediaType> {
    let essence = raw.split(';').next()?.trim().to_lowercase();
    let (kind, subtype) = essence.split_once('/')?;

    let is_token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    if !is_token(kind) || !is_token(subtype) {
        return None;
    }

    let subtype = subtype.to_string();
    Some(ValidatedMediaType { essence, subtype })
}
