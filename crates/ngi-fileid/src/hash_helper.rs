//! Hash-addressed identifiers
//!
//! `<folder>/<hash10>/<name>[__<variant>]<ext>[.webp]`

use crate::derived::DerivedFormat;
use crate::error::FileIdError;
use crate::hash::{is_truncated_hash, truncate_hash};
use crate::helper::{private, AddressingScheme, FileIdHelper};
use crate::layout;
use crate::tuple::FileTuple;
use once_cell::sync::Lazy;
use regex::Regex;

static HASH_FILE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<folder>(?:[^/]+/)*)(?P<hash>[a-f0-9]{10})/(?P<basename>[^/.]+?)(?:__(?P<variant>[^./]+))?(?P<extension>(?:\.[^/]+)*)$",
    )
    .expect("static pattern compiles")
});

/// Hash-addressed layout
///
/// Variants of an original share its folder and hash segment, which is why
/// [`FileIdHelper::look_for_variant_in`] returns `<folder>/<hash10>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashFileIdHelper {
    derived: Option<DerivedFormat>,
}

impl HashFileIdHelper {
    /// Base flavour: parses any hash-addressed identifier
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
        HASH_FILE_ID
            .captures(file_id)
            .map(|caps| layout::tuple_from_captures(&caps, file_id))
    }
}

impl private::Sealed for HashFileIdHelper {}

impl FileIdHelper for HashFileIdHelper {
    fn scheme(&self) -> AddressingScheme {
        AddressingScheme::Hash
    }

    fn derived_format(&self) -> Option<&DerivedFormat> {
        self.derived.as_ref()
    }

    fn clean_filename(&self, filename: &str) -> String {
        layout::clean(filename, self.derived.as_ref())
    }

    fn build_file_id(&self, filename: &str, hash: &str, variant: &str) -> Result<String, FileIdError> {
        if hash.is_empty() {
            return Err(FileIdError::MissingHash);
        }
        let truncated = truncate_hash(hash);
        if !is_truncated_hash(truncated) {
            return Err(FileIdError::InvalidHash(hash.to_string()));
        }
        let split = layout::split(filename, variant)?;
        layout::require_suffix(self.derived.as_ref(), filename)?;
        Ok(layout::compose(&split, Some(truncated), variant))
    }

    fn parse_file_id(&self, file_id: &str) -> Option<FileTuple> {
        layout::parse_with(self.derived.as_ref(), file_id, Self::parse_layout)
    }

    fn truncate<'a>(&self, hash: &'a str) -> &'a str {
        truncate_hash(hash)
    }

    fn look_for_variant_in(&self, original: &FileTuple) -> String {
        let truncated = self.truncate(original.hash());
        match layout::dirname(original.filename()) {
            "" => truncated.to_string(),
            folder => format!("{folder}/{truncated}"),
        }
    }
}
