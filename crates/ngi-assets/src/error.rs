//! Error types for asset materialization
//!
//! Provides error handling for:
//! - Store operations (collaborator I/O)
//! - Codec operations (decode, encode, resize)
//! - Materialization (including fatal contract violations)
//! - Configuration loading

use ngi_fileid::FileIdError;
use std::path::PathBuf;

/// Errors reported by an asset store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying storage failed
    #[error("io error on '{file_id}': {source}")]
    Io {
        file_id: String,
        #[source]
        source: std::io::Error,
    },

    /// Write refused because the key exists and conflict mode is `error`
    #[error("file already exists: '{0}'")]
    Conflict(String),

    /// Session grant could not be issued
    #[error("grant refused for '{filename}': {reason}")]
    GrantRefused { filename: String, reason: String },

    /// Key could not be turned into an identifier
    #[error(transparent)]
    FileId(#[from] FileIdError),
}

impl StoreError {
    /// Create IO error for an identifier
    pub fn io_error(file_id: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            file_id: file_id.into(),
            source,
        }
    }
}

/// Errors reported by an image backend
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Source bytes are not a decodable image
    #[error("could not decode image: {0}")]
    Decode(String),

    /// Encoder does not support the requested format
    #[error("unsupported output format '{0}'")]
    UnsupportedFormat(String),

    /// Encoding failed
    #[error("encoding to {format} failed: {message}")]
    Encode { format: String, message: String },

    /// Resize failed
    #[error("resize to {width}x{height} failed: {message}")]
    Resize {
        width: u32,
        height: u32,
        message: String,
    },

    /// Reading the encoded stream failed
    #[error("io error reading encoded image: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors during variant materialization
///
/// Declined or inapplicable materializations are `Ok(None)`, never errors.
#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    /// Store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Codec failed
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Identifier could not be built
    #[error("file id error: {0}")]
    FileId(#[from] FileIdError),

    /// A collaborator broke its contract; never recovered from
    #[error("contract violation: {0}")]
    ContractViolation(String),
}

impl MaterializeError {
    /// Store wrote a different key than the one requested
    pub fn key_mismatch(expected_filename: &str, expected_variant: &str, actual: &ngi_fileid::FileTuple) -> Self {
        Self::ContractViolation(format!(
            "store wrote '{}' (variant '{}') for requested '{expected_filename}' (variant '{expected_variant}')",
            actual.filename(),
            actual.variant()
        ))
    }
}

/// Errors while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML did not match the config schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Derived-format settings are unusable
    #[error("invalid derived format: {0}")]
    DerivedFormat(#[from] FileIdError),

    /// Quality outside 1..=100
    #[error("quality must be between 1 and 100, got {0}")]
    Quality(u8),
}
