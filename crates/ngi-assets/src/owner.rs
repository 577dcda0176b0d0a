//! Owner records
//!
//! Anything that points at a stored file and may have variants generated
//! from it: a database image record, or a handle returned by an earlier
//! materialization.

use crate::backend::ImageBackend;
use crate::store::Visibility;
use ngi_fileid::{DerivedFormat, FileTuple};
use std::collections::BTreeMap;

/// Source of a manipulation
pub trait ManipulationOwner {
    fn filename(&self) -> &str;

    fn hash(&self) -> &str;

    fn variant(&self) -> &str;

    /// Whether the owner points at a stored file
    fn exists(&self) -> bool;

    /// Whether missing variants may be generated, or only existing ones returned
    fn allow_generation(&self) -> bool {
        true
    }

    /// Visibility applied to generated variants
    fn visibility(&self) -> Visibility {
        Visibility::Public
    }

    /// Auxiliary attributes copied onto every derived handle
    fn attributes(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Stored width and height, if known without decoding
    fn dimensions(&self) -> Option<(u32, u32)> {
        None
    }

    /// Hand over the live decoded image, if one is loaded
    fn take_image_backend(&mut self) -> Option<Box<dyn ImageBackend>>;

    /// Whether the owner's file is already in `format`
    fn is_derived_format(&self, format: &DerivedFormat) -> bool {
        format.is_derived(self.filename())
    }

    /// The owner's key as a tuple
    fn file_tuple(&self) -> FileTuple {
        FileTuple::new(self.filename(), self.hash(), self.variant())
    }
}
