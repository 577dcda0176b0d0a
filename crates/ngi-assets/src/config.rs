//! Workspace configuration
//!
//! Built once at process start and passed down explicitly.
//!
//! ```toml
//! addressing = "hash"
//!
//! [derived_format]
//! extension = "webp"
//! mime_type = "image/webp"
//! quality = 80
//!
//! [render]
//! allow_session_grant = false
//! lazy_loading = true
//! cache_capacity = 10000
//! cache_ttl_secs = 3600
//! ```

use crate::error::ConfigError;
use ngi_fileid::{AddressingScheme, DerivedFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextGenConfig {
    /// Derived-format encoding settings
    pub derived_format: DerivedFormatConfig,
    /// Identifier layout of the host store
    pub addressing: AddressingScheme,
    /// Shortcode rendering settings
    pub render: RenderConfig,
}

impl NextGenConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With addressing scheme
    #[inline]
    #[must_use]
    pub fn with_addressing(mut self, addressing: AddressingScheme) -> Self {
        self.addressing = addressing;
        self
    }

    /// With encoder quality
    #[inline]
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.derived_format.quality = quality;
        self
    }

    /// With session grants on cached renders
    #[inline]
    #[must_use]
    pub fn with_session_grant(mut self, allow: bool) -> Self {
        self.render.allow_session_grant = allow;
        self
    }

    /// With render cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: u64) -> Self {
        self.render.cache_capacity = capacity;
        self
    }

    /// Parse and validate TOML
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or fails validation
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is malformed, or fails validation
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check settings that serde cannot
    ///
    /// # Errors
    /// Returns error for an unusable extension or out-of-range quality
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.derived_format.format()?;
        if !(1..=100).contains(&self.derived_format.quality) {
            return Err(ConfigError::Quality(self.derived_format.quality));
        }
        Ok(())
    }
}

/// Derived-format encoding settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedFormatConfig {
    /// Bare extension, also the encoder format name
    pub extension: String,
    pub mime_type: String,
    /// Encoder quality, 1..=100
    pub quality: u8,
}

impl DerivedFormatConfig {
    /// Validated derived format
    ///
    /// # Errors
    /// Returns error if the extension is empty or not bare
    pub fn format(&self) -> Result<DerivedFormat, ConfigError> {
        Ok(DerivedFormat::new(self.extension.clone(), self.mime_type.clone())?)
    }
}

impl Default for DerivedFormatConfig {
    fn default() -> Self {
        Self {
            extension: "webp".to_string(),
            mime_type: "image/webp".to_string(),
            quality: 80,
        }
    }
}

/// Shortcode rendering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Grant session access to the cached origin on every cache hit
    pub allow_session_grant: bool,
    /// Add `loading="lazy"` when dimensions are known
    pub lazy_loading: bool,
    /// Maximum cached renders
    pub cache_capacity: u64,
    /// Time-to-live of cached renders; unbounded when absent
    pub cache_ttl_secs: Option<u64>,
}

impl RenderConfig {
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            allow_session_grant: false,
            lazy_loading: true,
            cache_capacity: 10_000,
            cache_ttl_secs: None,
        }
    }
}
