//! Decoded file identifiers
//!
//! Provides [`FileTuple`], the decoded form of a store identifier.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Decoded form of a file identifier
///
/// `filename` never contains the variant tag; it is carried separately in
/// `variant`. `hash` may be empty or truncated depending on where the tuple
/// came from. `file_id` is empty until a codec has built or parsed one.
///
/// # Examples
/// - `folder/abc1234567/logo__ScaleWidthWzEwMF0.png.webp` decodes to
///   filename `folder/logo.png.webp`, hash `abc1234567`,
///   variant `ScaleWidthWzEwMF0`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileTuple {
    filename: String,
    hash: String,
    variant: String,
    file_id: String,
}

impl FileTuple {
    /// Create a tuple without an identifier
    #[inline]
    #[must_use]
    pub fn new(
        filename: impl Into<String>,
        hash: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            hash: hash.into(),
            variant: variant.into(),
            file_id: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    #[inline]
    #[must_use]
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Store identifier, empty if none has been built yet
    #[inline]
    #[must_use]
    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    /// Whether this tuple denotes a transform of an original
    #[inline]
    #[must_use]
    pub fn has_variant(&self) -> bool {
        !self.variant.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = file_id.into();
        self
    }

    /// Same tuple without the identifier, for comparing logical content
    #[inline]
    #[must_use]
    pub fn without_file_id(&self) -> Self {
        self.clone().with_file_id(String::new())
    }
}

impl Display for FileTuple {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.file_id.is_empty() {
            write!(f, "{} ({}, {})", self.filename, self.hash, self.variant)
        } else {
            f.write_str(&self.file_id)
        }
    }
}
