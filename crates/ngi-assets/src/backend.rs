//! Image codec capability
//!
//! An [`ImageBackend`] holds one decoded image. Decoded buffers are large, so
//! callers release them explicitly as soon as the encoded result has been
//! written or handed on.

use crate::error::{CodecError, StoreError};
use crate::store::{AssetStore, WriteConfig};
use ngi_fileid::{DerivedFormat, FileTuple};
use std::fmt::Debug;
use std::io::{Cursor, Read};
use tracing::debug;

/// Output of [`ImageBackend::encode`]
pub enum Encoded {
    /// Encoded bytes, written via [`AssetStore::set_from_stream`]
    Stream(Box<dyn Read + Send>),
    /// A live backend holding the re-encoded image
    Backend(Box<dyn ImageBackend>),
}

impl Encoded {
    /// Stream over an in-memory buffer
    #[must_use]
    pub fn bytes(data: Vec<u8>) -> Self {
        Self::Stream(Box::new(Cursor::new(data)))
    }
}

impl Debug for Encoded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream(_) => f.write_str("Encoded::Stream(..)"),
            Self::Backend(backend) => f.debug_tuple("Encoded::Backend").field(backend).finish(),
        }
    }
}

/// A decoded image plus the operations the materializer needs
pub trait ImageBackend: Send + Debug {
    /// Whether a decoded image is loaded
    fn has_resource(&self) -> bool;

    /// Width and height of the loaded image
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Encoder quality, 1..=100
    fn quality(&self) -> u8;

    /// Re-encode into `format`
    ///
    /// `Ok(None)` means the codec declined (nothing loaded, or the format
    /// cannot be produced from this image).
    ///
    /// # Errors
    /// Returns error if encoding was attempted and failed
    fn encode(&mut self, format: &str, quality: u8) -> Result<Option<Encoded>, CodecError>;

    /// Resized copy, or `Ok(None)` if nothing is loaded
    ///
    /// # Errors
    /// Returns error if resizing was attempted and failed
    fn resize(&mut self, width: u32, height: u32) -> Result<Option<Box<dyn ImageBackend>>, CodecError>;

    /// Encode in the image's own format and write it
    ///
    /// # Errors
    /// Returns error if the image cannot be encoded or the store write fails
    fn write_to_store(
        &mut self,
        store: &dyn AssetStore,
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<FileTuple, StoreError>;

    /// Drop the decoded buffer
    fn release(&mut self);
}

impl ImageBackend for Box<dyn ImageBackend> {
    fn has_resource(&self) -> bool {
        (**self).has_resource()
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        (**self).dimensions()
    }

    fn quality(&self) -> u8 {
        (**self).quality()
    }

    fn encode(&mut self, format: &str, quality: u8) -> Result<Option<Encoded>, CodecError> {
        (**self).encode(format, quality)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<Option<Box<dyn ImageBackend>>, CodecError> {
        (**self).resize(width, height)
    }

    fn write_to_store(
        &mut self,
        store: &dyn AssetStore,
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<FileTuple, StoreError> {
        (**self).write_to_store(store, filename, hash, variant, config)
    }

    fn release(&mut self) {
        (**self).release();
    }
}

/// Loads a backend for a stored file when its owner holds none
pub trait BackendLoader: Send + Sync {
    /// Decode the file behind `tuple`, or `Ok(None)` if it is not an image
    ///
    /// # Errors
    /// Returns error if the stored bytes cannot be read or decoded
    fn load(&self, tuple: &FileTuple) -> Result<Option<Box<dyn ImageBackend>>, CodecError>;
}

/// Write-through decorator producing a derived-format sibling
///
/// Every [`ImageBackend::write_to_store`] also stores the image encoded in the
/// derived format under `filename + suffix` with the same hash, variant and
/// write config. A sibling that cannot be encoded is skipped; a sibling write
/// that fails is an error.
#[derive(Debug)]
pub struct DerivedFormatBackend<B> {
    inner: B,
    format: DerivedFormat,
}

impl<B: ImageBackend> DerivedFormatBackend<B> {
    pub fn new(inner: B, format: DerivedFormat) -> Self {
        Self { inner, format }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }

    fn write_sibling(
        &mut self,
        store: &dyn AssetStore,
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<Option<FileTuple>, StoreError> {
        let derived = self.format.append(filename);
        let quality = self.inner.quality();
        let encoded = match self.inner.encode(self.format.extension(), quality) {
            Ok(Some(encoded)) => encoded,
            Ok(None) => {
                debug!(%filename, "codec declined derived sibling");
                return Ok(None);
            }
            Err(err) => {
                debug!(%filename, error = %err, "derived sibling not encoded");
                return Ok(None);
            }
        };
        let tuple = match encoded {
            Encoded::Stream(mut stream) => {
                store.set_from_stream(&mut stream, &derived, hash, variant, config)?
            }
            Encoded::Backend(mut backend) => {
                let tuple = backend.write_to_store(store, &derived, hash, variant, config);
                backend.release();
                tuple?
            }
        };
        Ok(Some(tuple))
    }
}

impl<B: ImageBackend> ImageBackend for DerivedFormatBackend<B> {
    fn has_resource(&self) -> bool {
        self.inner.has_resource()
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.inner.dimensions()
    }

    fn quality(&self) -> u8 {
        self.inner.quality()
    }

    /// Not wrapped: the output already is in the requested format
    fn encode(&mut self, format: &str, quality: u8) -> Result<Option<Encoded>, CodecError> {
        self.inner.encode(format, quality)
    }

    /// The resized copy keeps writing derived siblings
    fn resize(&mut self, width: u32, height: u32) -> Result<Option<Box<dyn ImageBackend>>, CodecError> {
        let format = self.format.clone();
        Ok(self.inner.resize(width, height)?.map(|resized| {
            Box::new(DerivedFormatBackend::new(resized, format)) as Box<dyn ImageBackend>
        }))
    }

    fn write_to_store(
        &mut self,
        store: &dyn AssetStore,
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<FileTuple, StoreError> {
        let tuple = self.inner.write_to_store(store, filename, hash, variant, config)?;
        if let Some(sibling) = self.write_sibling(store, filename, tuple.hash(), variant, config)? {
            debug!(file_id = %sibling, "wrote derived sibling");
        }
        Ok(tuple)
    }

    fn release(&mut self) {
        self.inner.release();
    }
}
