//! Canonical references and their one-way hash tokens.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A normalized URL. Equality defines request identity.
///
/// # Examples
///
/// ```
/// use siphon_core::CanonicalReference;
///
/// let a = CanonicalReference::new("https://ex.com/v/123");
/// let b = CanonicalReference::new("https://ex.com/v/123");
/// assert_eq!(a, b);
/// assert_eq!(a.hash(), b.hash());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct CanonicalReference(String);

impl CanonicalReference {
    /// Wrap an already normalized URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digest of this reference, used as cache key and opaque token.
    pub fn hash(&self) -> UrlHash {
        UrlHash::of(&self.0)
    }
}

impl AsRef<str> for CanonicalReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fixed-length digest of a canonical reference.
///
/// The first 16 bytes of SHA-256, rendered as 32 lower-case hex characters.
/// Short enough to fit transport payload limits such as callback data.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display,
)]
#[serde(transparent)]
pub struct UrlHash(String);

/// Length in characters of a rendered [`UrlHash`].
pub const HASH_LEN: usize = 32;

impl UrlHash {
    /// Hash an arbitrary string.
    pub fn of(value: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(value.as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        Self(hex[..HASH_LEN].to_string())
    }

    /// Accept a token only if it looks like a rendered hash.
    ///
    /// ```
    /// use siphon_core::UrlHash;
    ///
    /// assert!(UrlHash::parse("0123456789abcdef0123456789abcdef").is_some());
    /// assert!(UrlHash::parse("https://ex.com").is_none());
    /// assert!(UrlHash::parse("0123456789ABCDEF0123456789ABCDEF").is_none());
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        let valid = token.len() == HASH_LEN
            && token
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(token.to_string()))
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UrlHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_parseable() {
        let reference = CanonicalReference::new("https://ex.com/v/123");
        let hash = reference.hash();
        assert_eq!(hash.as_str().len(), HASH_LEN);
        assert_eq!(UrlHash::parse(hash.as_str()), Some(hash.clone()));
        assert_ne!(hash, CanonicalReference::new("https://ex.com/v/124").hash());
    }
}
