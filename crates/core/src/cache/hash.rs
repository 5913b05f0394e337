//! URL-addressed cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for an image URL.
///
/// Always call this with the original URL, never a proxied one, so that
/// toggling the proxy does not change cache identity.
pub fn compute_cache_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
