//! The derived-format suffix
//!
//! A derived-format identifier is the identifier of the asset it was encoded
//! from with a fixed suffix appended after every other piece of structure.

use crate::error::FileIdError;
use serde::{Deserialize, Serialize};

/// Derived (re-encoded) format marker, e.g. `.webp`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivedFormat {
    extension: String,
    suffix: String,
    mime_type: String,
}

impl DerivedFormat {
    /// Create a derived format from a bare extension (`webp`, not `.webp`)
    ///
    /// # Errors
    /// Returns error if the extension is empty or contains `.` or a path separator
    pub fn new(extension: impl Into<String>, mime_type: impl Into<String>) -> Result<Self, FileIdError> {
        let extension = extension.into();
        if extension.is_empty() || extension.contains(['.', '/', '\\']) {
            return Err(FileIdError::InvalidExtension(extension));
        }
        Ok(Self {
            suffix: format!(".{extension}"),
            extension,
            mime_type: mime_type.into(),
        })
    }

    /// WebP, the format this workspace is built around
    #[must_use]
    pub fn webp() -> Self {
        Self {
            extension: "webp".to_string(),
            suffix: ".webp".to_string(),
            mime_type: "image/webp".to_string(),
        }
    }

    /// Encoder format name
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Suffix appended to identifiers and filenames
    #[inline]
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Whether `name` already carries the derived-format suffix
    #[inline]
    #[must_use]
    pub fn is_derived(&self, name: &str) -> bool {
        name.ends_with(&self.suffix)
    }

    /// Remove one trailing suffix, if present
    #[inline]
    #[must_use]
    pub fn strip<'a>(&self, name: &'a str) -> &'a str {
        name.strip_suffix(self.suffix.as_str()).unwrap_or(name)
    }

    /// Remove every trailing suffix
    #[must_use]
    pub fn strip_all<'a>(&self, mut name: &'a str) -> &'a str {
        while let Some(stripped) = name.strip_suffix(self.suffix.as_str()) {
            name = stripped;
        }
        name
    }

    #[inline]
    #[must_use]
    pub fn append(&self, name: &str) -> String {
        format!("{name}{}", self.suffix)
    }
}

impl Default for DerivedFormat {
    fn default() -> Self {
        Self::webp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webp_suffix() {
        let format = DerivedFormat::webp();
        assert_eq!(format.suffix(), ".webp");
        assert!(format.is_derived("folder/a.png.webp"));
        assert!(!format.is_derived("folder/a.png"));
        assert!(!format.is_derived("folder/awebp"));
    }

    #[test]
    fn strip_removes_only_one_suffix() {
        let format = DerivedFormat::webp();
        assert_eq!(format.strip("a.png.webp.webp"), "a.png.webp");
        assert_eq!(format.strip_all("a.png.webp.webp"), "a.png");
        assert_eq!(format.strip("a.png"), "a.png");
    }

    #[test]
    fn new_rejects_dotted_extension() {
        assert!(matches!(DerivedFormat::new(".webp", "image/webp"), Err(FileIdError::InvalidExtension(_))));
        assert!(DerivedFormat::new("", "image/webp").is_err());
        assert_eq!(DerivedFormat::new("avif", "image/avif").unwrap().suffix(), ".avif");
    }
}
