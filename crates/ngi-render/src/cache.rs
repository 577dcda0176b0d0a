//! Render cache using moka
//!
//! Caches rendered shortcode markup by argument fingerprint, together with
//! the origin file so that a cache hit can still grant session access.

use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// One cached render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderCacheEntry {
    pub markup: String,
    /// Filename of the rendered file, if it was a stored file
    pub filename: Option<String>,
    pub hash: Option<String>,
}

impl RenderCacheEntry {
    #[must_use]
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            filename: None,
            hash: None,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, filename: impl Into<String>, hash: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self.hash = Some(hash.into());
        self
    }

    /// (filename, hash) to grant on a hit; none when no filename was recorded
    #[must_use]
    pub fn origin(&self) -> Option<(&str, &str)> {
        let filename = self.filename.as_deref().filter(|f| !f.is_empty())?;
        Some((filename, self.hash.as_deref().unwrap_or_default()))
    }
}

/// Shared render cache
pub trait RenderCache: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<RenderCacheEntry>;

    fn set(&self, key: &str, entry: RenderCacheEntry);
}

/// Statistics for cache monitoring
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
}

/// In-process render cache
///
/// Bounded by entry count with LRU-style eviction, optionally expiring
/// entries after a fixed time-to-live.
#[derive(Debug, Clone)]
pub struct MokaRenderCache {
    inner: Cache<String, Arc<RenderCacheEntry>>,
}

impl MokaRenderCache {
    /// Create new cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create cache with time-based expiration
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cache sized per render configuration
    #[must_use]
    pub fn from_config(config: &ngi_assets::RenderConfig) -> Self {
        match config.cache_ttl() {
            Some(ttl) => Self::with_ttl(config.cache_capacity, ttl),
            None => Self::new(config.cache_capacity),
        }
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[inline]
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
        }
    }
}

impl Default for MokaRenderCache {
    /// Create cache with default capacity (10,000 entries)
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl RenderCache for MokaRenderCache {
    fn get(&self, key: &str) -> Option<RenderCacheEntry> {
        self.inner.get(key).map(|entry| entry.as_ref().clone())
    }

    fn set(&self, key: &str, entry: RenderCacheEntry) {
        self.inner.insert(key.to_string(), Arc::new(entry));
    }
}
