//! Derived handles
//!
//! The result of a materialization. A handle is itself a
//! [`ManipulationOwner`], so transforms chain without reloading the image
//! from the store.

use crate::backend::ImageBackend;
use crate::owner::ManipulationOwner;
use crate::store::Visibility;
use ngi_fileid::FileTuple;
use std::collections::BTreeMap;

/// A materialized variant
#[derive(Debug)]
pub struct DerivedHandle {
    tuple: FileTuple,
    backend: Option<Box<dyn ImageBackend>>,
    attributes: BTreeMap<String, String>,
    original: Option<FileTuple>,
    allow_generation: bool,
    visibility: Visibility,
}

impl DerivedHandle {
    /// Handle for a stored tuple with no live image
    #[must_use]
    pub fn new(tuple: FileTuple) -> Self {
        Self {
            tuple,
            backend: None,
            attributes: BTreeMap::new(),
            original: None,
            allow_generation: true,
            visibility: Visibility::Public,
        }
    }

    /// Inherit attributes and generation settings from the owner it came from
    pub(crate) fn derived_from<O: ManipulationOwner + ?Sized>(tuple: FileTuple, owner: &O) -> Self {
        Self {
            tuple,
            backend: None,
            attributes: owner.attributes(),
            original: Some(owner.file_tuple()),
            allow_generation: owner.allow_generation(),
            visibility: owner.visibility(),
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Box<dyn ImageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_allow_generation(mut self, allow: bool) -> Self {
        self.allow_generation = allow;
        self
    }

    #[must_use]
    pub fn tuple(&self) -> &FileTuple {
        &self.tuple
    }

    /// Live image carried over from generation, if any
    #[must_use]
    pub fn backend(&self) -> Option<&dyn ImageBackend> {
        self.backend.as_deref()
    }

    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Key of the owner this handle was derived from
    ///
    /// A key rather than a reference: the handle never keeps its owner alive.
    #[must_use]
    pub fn original(&self) -> Option<&FileTuple> {
        self.original.as_ref()
    }
}

impl ManipulationOwner for DerivedHandle {
    fn filename(&self) -> &str {
        self.tuple.filename()
    }

    fn hash(&self) -> &str {
        self.tuple.hash()
    }

    fn variant(&self) -> &str {
        self.tuple.variant()
    }

    fn exists(&self) -> bool {
        !self.tuple.filename().is_empty()
    }

    fn allow_generation(&self) -> bool {
        self.allow_generation
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn attributes(&self) -> BTreeMap<String, String> {
        self.attributes.clone()
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.backend.as_ref().and_then(|backend| backend.dimensions())
    }

    fn take_image_backend(&mut self) -> Option<Box<dyn ImageBackend>> {
        self.backend.take()
    }

    fn file_tuple(&self) -> FileTuple {
        self.tuple.without_file_id()
    }
}
