//! Fake images: a codec that never touches pixels, and owners over stored files

use crate::store::MemoryStore;
use ngi_assets::{
    AssetStore, BackendLoader, CodecError, Encoded, ImageBackend, ManipulationOwner, StoreError, Visibility,
    WriteConfig,
};
use ngi_fileid::FileTuple;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Image whose encoded form is the text `format:WIDTHxHEIGHT`
#[derive(Debug, Clone)]
pub struct FakeImageBackend {
    width: u32,
    height: u32,
    format: String,
    quality: u8,
    loaded: bool,
    declined: Vec<String>,
    encode_to_backend: bool,
    encodes: Arc<AtomicUsize>,
}

impl FakeImageBackend {
    pub fn new(width: u32, height: u32, format: impl Into<String>) -> Self {
        Self {
            width,
            height,
            format: format.into(),
            quality: 75,
            loaded: true,
            declined: Vec::new(),
            encode_to_backend: false,
            encodes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Decode bytes written by [`FakeImageBackend::to_bytes`]
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(data).ok()?;
        let (format, size) = text.split_once(':')?;
        let (width, height) = size.split_once('x')?;
        Some(Self::new(width.parse().ok()?, height.parse().ok()?, format))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        format!("{}:{}x{}", self.format, self.width, self.height).into_bytes()
    }

    /// Decline to encode into `format`
    #[must_use]
    pub fn declining(mut self, format: impl Into<String>) -> Self {
        self.declined.push(format.into());
        self
    }

    /// Encode into a live backend instead of a byte stream
    #[must_use]
    pub fn encoding_to_backend(mut self) -> Self {
        self.encode_to_backend = true;
        self
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Encodes performed by this image and every copy made from it
    pub fn encode_count(&self) -> usize {
        self.encodes.load(Ordering::SeqCst)
    }
}

impl ImageBackend for FakeImageBackend {
    fn has_resource(&self) -> bool {
        self.loaded
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.loaded.then_some((self.width, self.height))
    }

    fn quality(&self) -> u8 {
        self.quality
    }

    fn encode(&mut self, format: &str, quality: u8) -> Result<Option<Encoded>, CodecError> {
        if !self.loaded || self.declined.iter().any(|declined| declined == format) {
            return Ok(None);
        }
        self.encodes.fetch_add(1, Ordering::SeqCst);
        let encoded = Self {
            format: format.to_string(),
            quality,
            ..self.clone()
        };
        Ok(Some(if self.encode_to_backend {
            Encoded::Backend(Box::new(encoded))
        } else {
            Encoded::bytes(encoded.to_bytes())
        }))
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<Option<Box<dyn ImageBackend>>, CodecError> {
        if !self.loaded {
            return Ok(None);
        }
        if width == 0 || height == 0 {
            return Err(CodecError::Resize {
                width,
                height,
                message: "empty target size".to_string(),
            });
        }
        Ok(Some(Box::new(Self {
            width,
            height,
            ..self.clone()
        })))
    }

    fn write_to_store(
        &mut self,
        store: &dyn AssetStore,
        filename: &str,
        hash: &str,
        variant: &str,
        config: &WriteConfig,
    ) -> Result<FileTuple, StoreError> {
        if !self.loaded {
            return Err(StoreError::io_error(filename, std::io::Error::other("no image loaded")));
        }
        store.set_from_string(&self.to_bytes(), filename, hash, variant, config)
    }

    fn release(&mut self) {
        self.loaded = false;
    }
}

/// Image record over a file in a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct StoredImage {
    tuple: FileTuple,
    exists: bool,
    dimensions: Option<(u32, u32)>,
    backend: Option<FakeImageBackend>,
    allow_generation: bool,
    visibility: Visibility,
    attributes: BTreeMap<String, String>,
}

impl StoredImage {
    /// Store a public `width` x `height` image and point at it
    pub fn upload(store: &MemoryStore, filename: &str, width: u32, height: u32) -> Self {
        Self::upload_with_visibility(store, filename, width, height, Visibility::Public)
    }

    pub fn upload_with_visibility(
        store: &MemoryStore,
        filename: &str,
        width: u32,
        height: u32,
        visibility: Visibility,
    ) -> Self {
        let backend = FakeImageBackend::new(width, height, extension_of(filename));
        let tuple = store.upload(filename, &backend.to_bytes(), visibility);
        Self {
            tuple: tuple.without_file_id(),
            exists: true,
            dimensions: Some((width, height)),
            backend: Some(backend),
            allow_generation: true,
            visibility,
            attributes: BTreeMap::new(),
        }
    }

    /// Record whose file was never stored
    pub fn missing(filename: &str) -> Self {
        Self {
            tuple: FileTuple::new(filename, "", ""),
            exists: false,
            dimensions: None,
            backend: None,
            allow_generation: true,
            visibility: Visibility::Public,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Option<FakeImageBackend>) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub fn with_allow_generation(mut self, allow: bool) -> Self {
        self.allow_generation = allow;
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn tuple(&self) -> &FileTuple {
        &self.tuple
    }

    pub fn backend(&self) -> Option<&FakeImageBackend> {
        self.backend.as_ref()
    }
}

fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map_or_else(String::new, |(_, ext)| ext.to_ascii_lowercase())
}

impl ManipulationOwner for StoredImage {
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
        self.exists
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
        self.dimensions
    }

    fn take_image_backend(&mut self) -> Option<Box<dyn ImageBackend>> {
        self.backend
            .take()
            .map(|backend| Box::new(backend) as Box<dyn ImageBackend>)
    }
}

/// Decodes stored files back into [`FakeImageBackend`]s
#[derive(Debug)]
pub struct MemoryBackendLoader {
    store: Arc<MemoryStore>,
    loads: AtomicUsize,
}

impl MemoryBackendLoader {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl BackendLoader for MemoryBackendLoader {
    fn load(&self, tuple: &FileTuple) -> Result<Option<Box<dyn ImageBackend>>, CodecError> {
        let Some(data) = self.store.read(tuple.filename(), tuple.hash(), tuple.variant()) else {
            return Ok(None);
        };
        self.loads.fetch_add(1, Ordering::SeqCst);
        let backend = FakeImageBackend::from_bytes(&data)
            .ok_or_else(|| CodecError::Decode(format!("not a fake image: {tuple}")))?;
        Ok(Some(Box::new(backend)))
    }
}
