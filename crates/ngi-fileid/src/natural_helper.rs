//! Natural-path identifiers
//!
//! `<folder>/<name>[__<variant>]<ext>[.webp]`, never under `_resampled`.

use crate::derived::DerivedFormat;
use crate::error::FileIdError;
use crate::helper::{private, AddressingScheme, FileIdHelper};
use crate::layout;
use crate::tuple::FileTuple;
use once_cell::sync::Lazy;
use regex::Regex;

/// Legacy namespace holding transform outputs; never a first-class original
pub const RESAMPLED_FOLDER: &str = "_resampled";

static NATURAL_FILE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<folder>(?:[^/]+/)*)(?P<basename>[^/.]+?)(?:__(?P<variant>[^./]+))?(?P<extension>(?:\.[^/]+)*)$",
    )
    .expect("static pattern compiles")
});

/// Natural-path layout (no hash segment)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NaturalFileIdHelper {
    derived: Option<DerivedFormat>,
}

impl NaturalFileIdHelper {
    /// Base flavour: parses any natural identifier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { derived: None }
    }

    /// Derived-format flavour: parses only identifiers ending in the suffix
    #[inline]
    #[must_use]
    pub fn derived(format: DerivedFormat) -> Self {
        Self {
            derived: Some(format),
        }
    }

    fn parse_layout(file_id: &str) -> Option<FileTuple> {
        let caps = NATURAL_FILE_ID.captures(file_id)?;
        let folder = caps.name("folder").map_or("", |m| m.as_str());
        if folder.contains(RESAMPLED_FOLDER) {
            return None;
        }
        Some(layout::tuple_from_captures(&caps, file_id))
    }
}

impl private::Sealed for NaturalFileIdHelper {}

impl FileIdHelper for NaturalFileIdHelper {
    fn scheme(&self) -> AddressingScheme {
        AddressingScheme::Natural
    }

    fn derived_format(&self) -> Option<&DerivedFormat> {
        self.derived.as_ref()
    }

    fn clean_filename(&self, filename: &str) -> String {
        layout::clean(filename, self.derived.as_ref())
    }

    /// The hash is accepted for signature parity but never embedded
    fn build_file_id(&self, filename: &str, _hash: &str, variant: &str) -> Result<String, FileIdError> {
        let split = layout::split(filename, variant)?;
        layout::require_suffix(self.derived.as_ref(), filename)?;
        if split.folder.contains(RESAMPLED_FOLDER) {
            return Err(FileIdError::ReservedFolder(split.folder.to_string()));
        }
        Ok(layout::compose(&split, None, variant))
    }

    fn parse_file_id(&self, file_id: &str) -> Option<FileTuple> {
        layout::parse_with(self.derived.as_ref(), file_id, Self::parse_layout)
    }

    fn truncate<'a>(&self, hash: &'a str) -> &'a str {
        &hash[..0]
    }

    fn look_for_variant_in(&self, original: &FileTuple) -> String {
        layout::dirname(original.filename()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn webp() -> NaturalFileIdHelper {
        NaturalFileIdHelper::derived(DerivedFormat::webp())
    }

    #[test]
    fn parses_derived_identifier() {
        let parsed = webp().parse_file_id("folder/wbg-logo__ScaleWidthWzEwMF0.png.webp").unwrap();
        assert_eq!(parsed.filename(), "folder/wbg-logo.png.webp");
        assert_eq!(parsed.hash(), "");
        assert_eq!(parsed.variant(), "ScaleWidthWzEwMF0");
    }

    #[test]
    fn resampled_namespace_is_rejected() {
        assert!(webp().parse_file_id("images/_resampled/x.png.webp").is_none());
        assert!(NaturalFileIdHelper::new().parse_file_id("images/_resampled/x.png").is_none());
        assert!(matches!(
            webp().build_file_id("images/_resampled/x.png.webp", "", ""),
            Err(FileIdError::ReservedFolder(_))
        ));
    }

    #[test]
    fn build_ignores_hash() {
        assert_eq!(
            webp().build_file_id("folder/wbg-logo.png.webp", "abc1234567", "v").unwrap(),
            "folder/wbg-logo__v.png.webp"
        );
    }

    #[test]
    fn derived_build_requires_suffix() {
        assert!(matches!(
            webp().build_file_id("folder/wbg-logo.png", "", "v"),
            Err(FileIdError::InvalidFilename { .. })
        ));
        assert_eq!(
            NaturalFileIdHelper::new().build_file_id("folder/wbg-logo.png", "", "v").unwrap(),
            "folder/wbg-logo__v.png"
        );
    }

    #[test]
    fn variant_of_compares_filenames_only() {
        let original = FileTuple::new("folder/wbg-logo.png", "abc1234567ffffffff", "");
        assert!(webp().is_variant_of("folder/wbg-logo.png.webp", &original));
        assert!(webp().is_variant_of("folder/wbg-logo__ScaleWidthWzEwMF0.png.webp", &original));
        assert!(!webp().is_variant_of("folder/wbg-logo.png", &original));
        assert!(!webp().is_variant_of("other/wbg-logo.png.webp", &original));
    }

    #[test]
    fn truncate_is_empty() {
        assert_eq!(webp().truncate("abc1234567ffff"), "");
    }
}
