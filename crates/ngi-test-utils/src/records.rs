//! Shortcode records held in memory

use crate::image::StoredImage;
use dashmap::DashMap;
use ngi_assets::Materializer;
use ngi_render::{AssetRecord, RecordLookup, RecordSource, ShortcodeArgs, ShortcodeRecord};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Records by shortcode `id`, plus an optional error record
#[derive(Debug)]
pub struct MemoryRecordSource {
    materializer: Arc<Materializer>,
    images: DashMap<String, (StoredImage, String)>,
    error_record: Mutex<Option<(StoredImage, String)>>,
    lookups: AtomicUsize,
}

impl MemoryRecordSource {
    pub fn new(materializer: Arc<Materializer>) -> Self {
        Self {
            materializer,
            images: DashMap::new(),
            error_record: Mutex::new(None),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, id: impl Into<String>, image: StoredImage, title: impl Into<String>) {
        self.images.insert(id.into(), (image, title.into()));
    }

    /// Rendered in place of records that cannot be found
    pub fn set_error_record(&self, image: StoredImage, title: impl Into<String>) {
        *self.error_record.lock() = Some((image, title.into()));
    }

    /// Calls to [`RecordSource::find`] so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl RecordSource for MemoryRecordSource {
    fn find(&self, args: &ShortcodeArgs) -> RecordLookup {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let Some(id) = args.get("id") else {
            return RecordLookup::Error(404);
        };
        match self.images.get(id) {
            Some(entry) => {
                let (image, title) = entry.value().clone();
                RecordLookup::Found(Box::new(AssetRecord::image(image, title, Arc::clone(&self.materializer))))
            }
            None => RecordLookup::Error(404),
        }
    }

    fn find_error_record(&self, _code: u16) -> Option<Box<dyn ShortcodeRecord>> {
        let (image, title) = self.error_record.lock().clone()?;
        Some(Box::new(AssetRecord::file(image, title, Arc::clone(&self.materializer))))
    }
}
