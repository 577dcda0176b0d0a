//! Content hashing primitives
//!
//! Provides [`ContentHash`], the 32-byte Blake3 digest used to address
//! original assets, and the truncation applied when a hash is embedded in a
//! hash-addressed file identifier.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Number of hex characters of a hash embedded in a hash-addressed identifier
pub const HASH_TRUNCATE_LENGTH: usize = 10;

/// A 32-byte content hash (Blake3)
///
/// Stores hand these out as lowercase hex strings; every [`crate::FileTuple`]
/// carries the hex form, possibly truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create hash from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| HashError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Compute Blake3 hash of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Compute hash from serializable value (JSON encoding)
    ///
    /// Map keys must have a stable order (e.g. `BTreeMap`) for the result to
    /// be a fingerprint.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn compute_serializable<T>(value: &T) -> Result<Self, HashError>
    where
        T: serde::Serialize + ?Sized,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }

    /// Full lowercase hex form
    #[inline]
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Fixed-length prefix of a hex hash string
///
/// Hashes shorter than [`HASH_TRUNCATE_LENGTH`] are returned unchanged.
#[must_use]
pub fn truncate_hash(hash: &str) -> &str {
    match hash.char_indices().nth(HASH_TRUNCATE_LENGTH) {
        Some((end, _)) => &hash[..end],
        None => hash,
    }
}

/// True when `hash` has the exact shape of an embedded hash segment
#[must_use]
pub fn is_truncated_hash(hash: &str) -> bool {
    hash.len() == HASH_TRUNCATE_LENGTH
        && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ContentHash {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl serde::Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when working with content hashes
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// Invalid hash length
    #[error("invalid hash length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(ContentHash::compute(b"png bytes"), ContentHash::compute(b"png bytes"));
        assert_ne!(ContentHash::compute(b"png bytes"), ContentHash::compute(b"webp bytes"));
    }

    #[test]
    fn truncated_is_prefix_of_hex() {
        let hash = ContentHash::compute(b"test");
        let hex = hash.to_hex();
        let short = truncate_hash(&hex);
        assert_eq!(short.len(), HASH_TRUNCATE_LENGTH);
        assert!(is_truncated_hash(short));
    }

    #[test]
    fn truncate_hash_leaves_short_hashes_alone() {
        assert_eq!(truncate_hash("abc"), "abc");
        assert_eq!(truncate_hash(""), "");
        assert_eq!(truncate_hash("abc1234567ffff"), "abc1234567");
    }

    #[test]
    fn is_truncated_hash_rejects_uppercase_and_length() {
        assert!(is_truncated_hash("abc1234567"));
        assert!(!is_truncated_hash("ABC1234567"));
        assert!(!is_truncated_hash("abc123456"));
        assert!(!is_truncated_hash("abc1234567a"));
    }

    #[test]
    fn display_and_parse() {
        let hash = ContentHash::compute(b"test");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn from_slice_invalid_length() {
        let result = ContentHash::from_slice(&[1u8; 31]);
        assert!(matches!(result, Err(HashError::InvalidLength { expected: 32, actual: 31 })));
    }

    #[test]
    fn serde_uses_hex_string() {
        let hash = ContentHash::compute(b"test");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        let decoded: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, decoded);
    }

    #[test]
    fn compute_serializable_is_stable_for_ordered_maps() {
        let mut a = std::collections::BTreeMap::new();
        a.insert("width", "100");
        a.insert("id", "3");
        let mut b = std::collections::BTreeMap::new();
        b.insert("id", "3");
        b.insert("width", "100");
        assert_eq!(
            ContentHash::compute_serializable(&a).unwrap(),
            ContentHash::compute_serializable(&b).unwrap()
        );
    }
}
