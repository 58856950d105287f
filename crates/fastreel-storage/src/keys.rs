//! Storage key generation shared by every backend.
//!
//! Key format: `{aspect_class}/{token}.{extension}` where `token` is 64 lowercase hex
//! characters drawn from the thread-local CSPRNG. No existence check is made against the
//! store; 256 bits of entropy makes a collision practically impossible.

use fastreel_core::constants::STORAGE_KEY_TOKEN_BYTES;
use fastreel_core::AspectClass;
use rand::RngCore;

/// Build a fresh key for an object of the given aspect class.
///
/// `extension` is appended after a `.`; an empty extension produces a key without a dot.
pub fn build_storage_key(aspect: AspectClass, extension: &str) -> String {
    let token = random_token();
    let extension = extension.trim_start_matches('.');
    if extension.is_empty() {
        format!("{}/{}", aspect, token)
    } else {
        format!("{}/{}.{}", aspect, token, extension)
    }
}

/// 32 random bytes, hex encoded.
pub fn random_token() -> String {
    let mut bytes = [0u8; STORAGE_KEY_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Reject keys that could escape a bucket when mapped onto a filesystem or URL path.
pub fn validate_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('/')
        && !key.contains('\\')
        && !key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..")
}
