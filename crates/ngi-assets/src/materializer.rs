//! Variant materialization
//!
//! Generates a variant of an owner's file at most once per key: if the store
//! already holds the key the generation callback is never invoked. Concurrent
//! callers racing on the same key may both generate; the `use-existing`
//! write makes them converge on one stored file.

use crate::backend::{BackendLoader, Encoded, ImageBackend};
use crate::config::NextGenConfig;
use crate::error::{CodecError, ConfigError, MaterializeError};
use crate::handle::DerivedHandle;
use crate::owner::ManipulationOwner;
use crate::store::{AssetStore, WriteConfig};
use ngi_fileid::{variant_name, DerivedFormat, FileIdHelper, FileTuple, SchemeHelper};
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a generation callback produced
#[derive(Debug)]
pub struct Manipulated {
    tuple: FileTuple,
    resource: Option<Box<dyn ImageBackend>>,
}

impl Manipulated {
    /// A stored tuple with no live image attached
    #[must_use]
    pub fn new(tuple: FileTuple) -> Self {
        Self {
            tuple,
            resource: None,
        }
    }

    /// Hand the live image on to the resulting handle for chaining
    #[must_use]
    pub fn with_resource(mut self, resource: Box<dyn ImageBackend>) -> Self {
        self.resource = Some(resource);
        self
    }

    #[must_use]
    pub fn tuple(&self) -> &FileTuple {
        &self.tuple
    }
}

/// Result of [`Materializer::derived_format`]
#[derive(Debug)]
pub enum Derived<'a, O: ?Sized> {
    /// The owner already is in the derived format
    Original(&'a O),
    /// A derived-format variant was found or generated
    Generated(DerivedHandle),
}

impl<O: ManipulationOwner + ?Sized> Derived<'_, O> {
    /// Key of whichever file the result denotes
    #[must_use]
    pub fn file_tuple(&self) -> FileTuple {
        match self {
            Self::Original(owner) => owner.file_tuple(),
            Self::Generated(handle) => handle.file_tuple(),
        }
    }
}

/// Generates and finds variants in one store
pub struct Materializer {
    store: Arc<dyn AssetStore>,
    helper: SchemeHelper,
    format: DerivedFormat,
    quality: u8,
    loader: Option<Arc<dyn BackendLoader>>,
}

impl Materializer {
    /// Materializer for `store`, laid out per `config`
    ///
    /// # Errors
    /// Returns error if `config` fails validation
    pub fn new(store: Arc<dyn AssetStore>, config: &NextGenConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let format = config.derived_format.format()?;
        Ok(Self {
            store,
            helper: config.addressing.derived_helper(format.clone()),
            format,
            quality: config.derived_format.quality,
            loader: None,
        })
    }

    /// Load images from the store when an owner holds no live image
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn BackendLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    #[must_use]
    pub fn format(&self) -> &DerivedFormat {
        &self.format
    }

    /// Derived-format-aware codec of the store's scheme
    #[must_use]
    pub fn helper(&self) -> &SchemeHelper {
        &self.helper
    }

    /// Find or generate the derived-format variant of `owner`
    ///
    /// The output key is the cleaned owner filename plus the derived suffix,
    /// the owner's hash, and the owner's variant if it has one, else
    /// `variant`. `callback` runs only when the store lacks that key and the
    /// owner allows generation. An owner already in the derived format is
    /// returned as its own handle without a lookup.
    ///
    /// # Errors
    /// Returns error if the callback or a collaborator fails, or if the
    /// callback reports a tuple for a different key
    pub fn materialize<O, F>(
        &self,
        owner: &mut O,
        variant: &str,
        callback: F,
    ) -> Result<Option<DerivedHandle>, MaterializeError>
    where
        O: ManipulationOwner + ?Sized,
        F: FnOnce(&mut O, &dyn AssetStore, &FileTuple) -> Result<Option<Manipulated>, MaterializeError>,
    {
        if !Self::applicable(&*owner) {
            return Ok(None);
        }
        if owner.is_derived_format(&self.format) {
            debug!(filename = %owner.filename(), "owner already in derived format");
            return Ok(Some(DerivedHandle::derived_from(owner.file_tuple(), &*owner)));
        }
        let filename = self.format.append(&self.helper.clean_filename(owner.filename()));
        let variant = if owner.variant().is_empty() {
            variant
        } else {
            owner.variant()
        };
        let target = FileTuple::new(filename, owner.hash(), variant);
        self.produce(owner, target, callback)
    }

    /// Find or generate a transform of `owner` under the same filename
    ///
    /// A variant on an already-transformed owner is appended to its
    /// existing variant, separated by `_`.
    ///
    /// # Errors
    /// Returns error if the callback or a collaborator fails, or if the
    /// callback reports a tuple for a different key
    pub fn manipulate<O, F>(
        &self,
        owner: &mut O,
        variant: &str,
        callback: F,
    ) -> Result<Option<DerivedHandle>, MaterializeError>
    where
        O: ManipulationOwner + ?Sized,
        F: FnOnce(&mut O, &dyn AssetStore, &FileTuple) -> Result<Option<Manipulated>, MaterializeError>,
    {
        if !Self::applicable(&*owner) {
            return Ok(None);
        }
        let variant = if owner.variant().is_empty() {
            variant.to_string()
        } else {
            format!("{}_{variant}", owner.variant())
        };
        let target = FileTuple::new(owner.filename(), owner.hash(), variant);
        self.produce(owner, target, callback)
    }

    /// The owner in the derived format
    ///
    /// Returns the owner itself when it already is derived, otherwise finds
    /// or encodes its derived-format variant.
    ///
    /// # Errors
    /// Returns error if encoding or the store write fails
    pub fn derived_format<'a, O>(&self, owner: &'a mut O) -> Result<Option<Derived<'a, O>>, MaterializeError>
    where
        O: ManipulationOwner + ?Sized,
    {
        if owner.is_derived_format(&self.format) {
            debug!(filename = %owner.filename(), "owner already in derived format");
            return Ok(Some(Derived::Original(owner)));
        }
        let variant = owner.variant().to_string();
        let handle = self.materialize(owner, &variant, |owner, store, target| {
            self.encode_derived(owner, store, target)
        })?;
        Ok(handle.map(Derived::Generated))
    }

    /// Resize to exactly `width` x `height`
    ///
    /// # Errors
    /// Returns error if resizing or the store write fails
    pub fn resize<O>(&self, owner: &mut O, width: u32, height: u32) -> Result<Option<DerivedHandle>, MaterializeError>
    where
        O: ManipulationOwner + ?Sized,
    {
        self.transform(owner, "ResizedImage", &[width, height], |backend| {
            backend.resize(width, height)
        })
    }

    /// Scale to `width`, keeping the aspect ratio
    ///
    /// # Errors
    /// Returns error if resizing or the store write fails
    pub fn scale_width<O>(&self, owner: &mut O, width: u32) -> Result<Option<DerivedHandle>, MaterializeError>
    where
        O: ManipulationOwner + ?Sized,
    {
        self.transform(owner, "ScaleWidth", &[width], |backend| {
            let Some((current_width, current_height)) = backend.dimensions() else {
                return Ok(None);
            };
            let height = scaled_height(current_width, current_height, width);
            backend.resize(width, height)
        })
    }

    fn applicable<O: ManipulationOwner + ?Sized>(owner: &O) -> bool {
        if !owner.exists() {
            debug!(filename = %owner.filename(), "owner does not exist");
            return false;
        }
        if owner.filename().is_empty() || owner.hash().is_empty() {
            debug!(filename = %owner.filename(), "owner has no filename or hash");
            return false;
        }
        true
    }

    fn produce<O, F>(&self, owner: &mut O, target: FileTuple, callback: F) -> Result<Option<DerivedHandle>, MaterializeError>
    where
        O: ManipulationOwner + ?Sized,
        F: FnOnce(&mut O, &dyn AssetStore, &FileTuple) -> Result<Option<Manipulated>, MaterializeError>,
    {
        let store = self.store.as_ref();
        if store.exists(target.filename(), target.hash(), target.variant()) {
            debug!(file = %target, "variant already stored");
            return Ok(Some(DerivedHandle::derived_from(target, &*owner)));
        }
        if !owner.allow_generation() {
            debug!(file = %target, "generation disabled for owner");
            return Ok(None);
        }

        let Some(Manipulated { tuple, resource }) = callback(owner, store, &target)? else {
            debug!(file = %target, "manipulation declined");
            return Ok(None);
        };
        if tuple.filename() != target.filename() || tuple.variant() != target.variant() {
            warn!(requested = %target, written = %tuple, "store wrote a different key");
            return Err(MaterializeError::key_mismatch(target.filename(), target.variant(), &tuple));
        }

        info!(file = %tuple, "generated variant");
        let handle = DerivedHandle::derived_from(tuple, &*owner);
        Ok(Some(match resource {
            Some(resource) => handle.with_backend(resource),
            None => handle,
        }))
    }

    /// Encode the owner's image into the derived format and store it
    fn encode_derived<O>(
        &self,
        owner: &mut O,
        store: &dyn AssetStore,
        target: &FileTuple,
    ) -> Result<Option<Manipulated>, MaterializeError>
    where
        O: ManipulationOwner + ?Sized,
    {
        let Some(mut backend) = self.backend_for(owner)? else {
            return Ok(None);
        };
        if !backend.has_resource() {
            backend.release();
            return Ok(None);
        }

        let config = WriteConfig::use_existing(owner.visibility());
        let written = match backend.encode(self.format.extension(), self.quality) {
            Ok(None) => Ok(None),
            Ok(Some(Encoded::Stream(mut stream))) => store
                .set_from_stream(&mut stream, target.filename(), target.hash(), target.variant(), &config)
                .map(|tuple| Some(Manipulated::new(tuple)))
                .map_err(MaterializeError::from),
            Ok(Some(Encoded::Backend(mut result))) => {
                match result.write_to_store(store, target.filename(), target.hash(), target.variant(), &config) {
                    Ok(tuple) => Ok(Some(Manipulated::new(tuple).with_resource(result))),
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        };
        backend.release();
        written
    }

    fn transform<O, Op>(
        &self,
        owner: &mut O,
        method: &str,
        args: &[u32],
        op: Op,
    ) -> Result<Option<DerivedHandle>, MaterializeError>
    where
        O: ManipulationOwner + ?Sized,
        Op: FnOnce(&mut dyn ImageBackend) -> Result<Option<Box<dyn ImageBackend>>, CodecError>,
    {
        let variant = variant_name(method, args)?;
        self.manipulate(owner, &variant, |owner, store, target| {
            let Some(mut backend) = self.backend_for(owner)? else {
                return Ok(None);
            };
            let transformed = op(backend.as_mut());
            backend.release();
            let Some(mut result) = transformed? else {
                return Ok(None);
            };

            let config = WriteConfig::use_existing(owner.visibility());
            let tuple = result.write_to_store(store, target.filename(), target.hash(), target.variant(), &config)?;
            Ok(Some(Manipulated::new(tuple).with_resource(result)))
        })
    }

    /// The owner's live image, else one loaded from the store
    fn backend_for<O>(&self, owner: &mut O) -> Result<Option<Box<dyn ImageBackend>>, CodecError>
    where
        O: ManipulationOwner + ?Sized,
    {
        if let Some(backend) = owner.take_image_backend() {
            return Ok(Some(backend));
        }
        match &self.loader {
            Some(loader) => loader.load(&owner.file_tuple()),
            None => {
                debug!(filename = %owner.filename(), "no image backend available");
                Ok(None)
            }
        }
    }
}

impl Debug for Materializer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Materializer")
            .field("helper", &self.helper)
            .field("format", &self.format)
            .field("quality", &self.quality)
            .field("loader", &self.loader.is_some())
            .finish_non_exhaustive()
    }
}

/// Height keeping the aspect ratio at `width`, rounded, at least 1
fn scaled_height(current_width: u32, current_height: u32, width: u32) -> u32 {
    if current_width == 0 {
        return current_height.max(1);
    }
    let numerator = u64::from(current_height) * u64::from(width) + u64::from(current_width) / 2;
    let height = numerator / u64::from(current_width);
    u32::try_from(height).unwrap_or(u32::MAX).max(1)
}
