//! Error types for identifier building
//!
//! Parsing never errors: an identifier that does not fit a scheme is `None`.
//! Building rejects tuples that could not be parsed back unambiguously.

/// Errors while building identifiers or variant names
#[derive(Debug, thiserror::Error)]
pub enum FileIdError {
    /// Filename has no usable basename
    #[error("filename is empty")]
    EmptyFilename,

    /// Filename cannot be laid out without ambiguity
    #[error("invalid filename '{filename}': {reason}")]
    InvalidFilename { filename: String, reason: &'static str },

    /// Hash-addressed identifiers need a hash
    #[error("hash-addressed identifier requires a hash")]
    MissingHash,

    /// Hash is not lowercase hex
    #[error("invalid hash '{0}': expected at least 10 lowercase hex characters")]
    InvalidHash(String),

    /// Variant contains a character reserved by the layout
    #[error("invalid variant '{0}'")]
    InvalidVariant(String),

    /// Natural-addressed identifiers may not live under the resampled namespace
    #[error("folder '{0}' is inside the reserved _resampled namespace")]
    ReservedFolder(String),

    /// Unknown addressing scheme name
    #[error("unknown addressing scheme '{0}' (expected 'hash' or 'natural')")]
    UnknownScheme(String),

    /// Derived-format extension is not a bare extension
    #[error("invalid derived-format extension '{0}'")]
    InvalidExtension(String),

    /// Variant arguments could not be encoded
    #[error("variant arguments could not be encoded: {0}")]
    VariantArgs(#[from] serde_json::Error),
}

impl FileIdError {
    pub(crate) fn invalid_filename(filename: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidFilename {
            filename: filename.into(),
            reason,
        }
    }
}
