//! Cache key derived from a normalized preview request.

use std::fmt;

use sha2::{Digest, Sha256};
use url::Url;

/// Fixed-length digest identifying a (width, height, source) triple.
///
/// The key is also the file stem of the finished preview on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Length of the hex-encoded SHA-256 digest.
    pub const LEN: usize = 64;

    /// Derives the key for a preview of `url` at `width`x`height`.
    #[must_use]
    pub fn derive(width: u32, height: u32, url: &Url) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(format!("{width}/{height}/{}", url.as_str()).as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Accepts a file stem as a key if it has the digest's exact shape.
    #[must_use]
    pub fn parse(stem: &str) -> Option<Self> {
        let well_formed = stem.len() == Self::LEN
            && stem
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(stem.to_string()))
    }

    /// Returns the inner string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
