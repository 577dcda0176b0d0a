//! Testing utilities for NGI workspace
//!
//! In-memory store, fake codec, image owners and record source, plus
//! fixture builders wiring them together.

#![allow(missing_docs)]

mod image;
mod records;
mod store;

pub use image::{FakeImageBackend, MemoryBackendLoader, StoredImage};
pub use records::MemoryRecordSource;
pub use store::{MemoryStore, StoredFile};

use ngi_assets::{AssetStore, BackendLoader, Materializer, NextGenConfig};
use std::sync::{Arc, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize tracing once per test binary
///
/// Uses `level` if given, else `RUST_LOG`; logs nothing when neither is set.
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// A store and a materializer over it, loading images back from the store
#[derive(Debug, Clone)]
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub loader: Arc<MemoryBackendLoader>,
    pub materializer: Arc<Materializer>,
}

impl Fixture {
    pub fn new(config: &NextGenConfig) -> Self {
        init_test_logging(None);
        let store = Arc::new(MemoryStore::new(config.addressing));
        let loader = Arc::new(MemoryBackendLoader::new(Arc::clone(&store)));
        let materializer = Materializer::new(Arc::clone(&store) as Arc<dyn AssetStore>, config)
            .unwrap()
            .with_loader(Arc::clone(&loader) as Arc<dyn BackendLoader>);
        Self {
            store,
            loader,
            materializer: Arc::new(materializer),
        }
    }

    pub fn upload(&self, filename: &str, width: u32, height: u32) -> StoredImage {
        StoredImage::upload(&self.store, filename, width, height)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new(&NextGenConfig::default())
    }
}
