//! Asset store contract
//!
//! The store owns persisted bytes and their identifiers. Writes are keyed by
//! (filename, hash, variant); the store decides where the bytes land.

use crate::error::StoreError;
use ngi_fileid::FileTuple;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// What a write does when its key already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Conflict {
    /// Keep the stored bytes and report the existing key
    UseExisting,
    /// Fail with [`StoreError::Conflict`]
    Error,
    /// Store under a fresh filename
    Rename,
}

/// Who may read a stored file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
}

/// Options for a single store write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteConfig {
    pub conflict: Conflict,
    pub visibility: Visibility,
}

impl WriteConfig {
    #[inline]
    #[must_use]
    pub fn new(conflict: Conflict, visibility: Visibility) -> Self {
        Self {
            conflict,
            visibility,
        }
    }

    /// Converging write used for generated variants
    #[inline]
    #[must_use]
    pub fn use_existing(visibility: Visibility) -> Self {
        Self::new(Conflict::UseExisting, visibility)
    }
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self::new(Conflict::Error, Visibility::Public)
    }
}

/// Persistent asset storage
///
/// A write for a variant passes the original's hash; a write for an original
/// passes an empty hash and the store computes one from the bytes. The
/// returned tuple must carry the requested filename and variant.
pub trait AssetStore: Send + Sync {
    /// Whether a file exists for the key
    fn exists(&self, filename: &str, hash: &str, variant: &str) -> bool;

    /// Write bytes read from `stream`
    ///
    /// # Errors
    /// Returns error if reading the stream or writing the file fails, or on conflict
    fn set_from_stream(
        &self,
        stream: &mut dyn Read,
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<FileTuple, StoreError>;

    /// Write in-memory bytes
    ///
    /// # Errors
    /// Returns error if writing the file fails, or on conflict
    fn set_from_string(
        &self,
        data: &[u8],
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<FileTuple, StoreError>;

    /// Grant the current session read access to a protected file
    ///
    /// # Errors
    /// Returns error if the store refuses the grant
    fn grant(&self, filename: &str, hash: &str) -> Result<(), StoreError>;

    /// Public URL of a stored file, optionally granting session access to it
    fn url(&self, filename: &str, hash: &str, variant: &str, grant: bool) -> Option<String>;
}
