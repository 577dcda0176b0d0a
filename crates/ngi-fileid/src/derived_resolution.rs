//! Derived-format-aware resolution
//!
//! Wraps a base [`TupleResolution`] so that derived copies
//! (`logo.png.webp` next to `logo.png`) resolve, strip and move together with
//! their originals.

use crate::derived::DerivedFormat;
use crate::error::FileIdError;
use crate::helper::{AddressingScheme, FileIdHelper, SchemeHelper};
use crate::resolution::{sweep, FileIdHelperResolutionStrategy, Filesystem, TupleResolution};
use crate::tuple::FileTuple;

/// Resolution decorator for one derived format
#[derive(Debug, Clone)]
pub struct DerivedFormatResolution<R = FileIdHelperResolutionStrategy> {
    inner: R,
    format: DerivedFormat,
    derived_helpers: Vec<SchemeHelper>,
}

impl<R: TupleResolution> DerivedFormatResolution<R> {
    /// Decorate `inner`, recognising derived identifiers of every scheme
    pub fn new(inner: R, format: DerivedFormat) -> Self {
        let derived_helpers = AddressingScheme::ALL
            .iter()
            .map(|scheme| scheme.derived_helper(format.clone()))
            .collect();
        Self {
            inner,
            format,
            derived_helpers,
        }
    }

    /// Restrict the derived helpers to the given schemes, in order
    #[must_use]
    pub fn with_schemes(mut self, schemes: &[AddressingScheme]) -> Self {
        self.derived_helpers = schemes
            .iter()
            .map(|scheme| scheme.derived_helper(self.format.clone()))
            .collect();
        self
    }

    #[must_use]
    pub fn inner(&self) -> &R {
        &self.inner
    }

    #[must_use]
    pub fn format(&self) -> &DerivedFormat {
        &self.format
    }

    /// Whether `file_id` is a derived variant of `original` under any scheme
    #[must_use]
    pub fn is_variant_of(&self, file_id: &str, original: &FileTuple) -> bool {
        self.derived_helpers
            .iter()
            .any(|helper| helper.is_variant_of(file_id, original))
    }

    fn strip_tuple(&self, tuple: FileTuple) -> FileTuple {
        let filename = self.format.strip(tuple.filename()).to_string();
        let file_id = self.format.strip(tuple.file_id()).to_string();
        tuple.with_filename(filename).with_file_id(file_id)
    }
}

impl<R: TupleResolution> TupleResolution for DerivedFormatResolution<R> {
    fn build_file_id(&self, tuple: &FileTuple) -> Result<String, FileIdError> {
        self.inner.build_file_id(tuple)
    }

    fn search_for_tuple(&self, tuple: &FileTuple, fs: &dyn Filesystem, strict: bool) -> Option<FileTuple> {
        if !self.format.is_derived(tuple.filename()) {
            return self.inner.search_for_tuple(tuple, fs, strict);
        }

        let original = tuple
            .clone()
            .with_filename(self.format.strip(tuple.filename()));
        let found = self.inner.search_for_tuple(&original, fs, strict)?;
        let filename = self.format.append(found.filename());
        let file_id = self.format.append(found.file_id());
        Some(found.with_filename(filename).with_file_id(file_id))
    }

    fn strip_variant(&self, file_id: &str) -> Option<FileTuple> {
        let stripped = self.inner.strip_variant(file_id)?;
        if self.format.is_derived(stripped.file_id()) {
            Some(self.strip_tuple(stripped))
        } else {
            Some(stripped)
        }
    }

    fn parse_file_id(&self, file_id: &str) -> Option<FileTuple> {
        self.derived_helpers
            .iter()
            .find_map(|helper| helper.parse_file_id(file_id))
            .or_else(|| self.inner.parse_file_id(file_id))
    }

    fn find_variants(&self, original: &FileTuple, fs: &dyn Filesystem) -> Vec<FileTuple> {
        let mut found = self.inner.find_variants(original, fs);
        for helper in &self.derived_helpers {
            sweep(helper, original, fs, &mut found);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::tests::MapFs;
    use pretty_assertions::assert_eq;

    const HASH: &str = "abc1234567ffffffffffffffffffffffffffffff";

    fn resolver() -> DerivedFormatResolution {
        let base = FileIdHelperResolutionStrategy::single(AddressingScheme::Hash.helper());
        DerivedFormatResolution::new(base, DerivedFormat::webp())
    }

    #[test]
    fn search_reattaches_suffix() {
        let fs = MapFs::with(&[
            ("folder/abc1234567/logo.png", HASH),
            ("folder/abc1234567/logo.png.webp", "webp-bytes"),
        ]);
        let found = resolver()
            .search_for_tuple(&FileTuple::new("folder/logo.png.webp", "abc1234567", ""), &fs, true)
            .unwrap();
        assert_eq!(found.filename(), "folder/logo.png.webp");
        assert_eq!(found.file_id(), "folder/abc1234567/logo.png.webp");
        assert_eq!(found.hash(), HASH);
    }

    #[test]
    fn search_passes_plain_tuples_through() {
        let fs = MapFs::with(&[("folder/abc1234567/logo.png", HASH)]);
        let found = resolver()
            .search_for_tuple(&FileTuple::new("folder/logo.png", "abc1234567", ""), &fs, true)
            .unwrap();
        assert_eq!(found.file_id(), "folder/abc1234567/logo.png");
    }

    #[test]
    fn strip_variant_drops_suffix_and_variant() {
        let stripped = resolver()
            .strip_variant("folder/abc1234567/logo__ScaleWidthWzEwMF0.png.webp")
            .unwrap();
        assert_eq!(stripped.filename(), "folder/logo.png");
        assert_eq!(stripped.file_id(), "folder/abc1234567/logo.png");
        assert_eq!(stripped.variant(), "");
    }

    #[test]
    fn find_variants_includes_derived_copies() {
        let fs = MapFs::with(&[
            ("folder/abc1234567/logo.png", HASH),
            ("folder/abc1234567/logo.png.webp", "1"),
            ("folder/abc1234567/logo__ScaleWidthWzEwMF0.png", "2"),
            ("folder/abc1234567/logo__ScaleWidthWzEwMF0.png.webp", "3"),
            ("folder/abc1234567/logo.gif.webp", "4"),
        ]);
        let original = FileTuple::new("folder/logo.png", HASH, "");
        let mut ids: Vec<String> = resolver()
            .find_variants(&original, &fs)
            .iter()
            .map(|t| t.file_id().to_string())
            .collect();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                "folder/abc1234567/logo.png".to_string(),
                "folder/abc1234567/logo.png.webp".to_string(),
                "folder/abc1234567/logo__ScaleWidthWzEwMF0.png".to_string(),
                "folder/abc1234567/logo__ScaleWidthWzEwMF0.png.webp".to_string(),
            ]
        );
    }

    #[test]
    fn parse_tries_derived_layouts_first() {
        let parsed = resolver()
            .parse_file_id("folder/abc1234567/logo.png.webp")
            .unwrap();
        assert_eq!(parsed.filename(), "folder/logo.png.webp");
        assert_eq!(parsed.hash(), "abc1234567");
    }

    #[test]
    fn variant_of_requires_suffix() {
        let original = FileTuple::new("folder/logo.png", HASH, "");
        assert!(resolver().is_variant_of("folder/abc1234567/logo.png.webp", &original));
        assert!(resolver().is_variant_of("folder/logo.png.webp", &original));
        assert!(!resolver().is_variant_of("folder/abc1234567/logo.png", &original));
    }
}
