//! NGI Render
//!
//! Cached rendering of image shortcodes as `<picture>` markup with a
//! derived-format (WebP by default) `<source>`.
//!
//! # Core Concepts
//!
//! - [`ImageShortcodeHandler`]: Cache gate and markup builder
//! - [`RenderCache`] / [`MokaRenderCache`]: Markup cache keyed by argument fingerprint
//! - [`ShortcodeRecord`] / [`RecordSource`]: The records shortcodes point at
//! - [`AssetRecord`]: A record over a materializer-backed owner

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod args;
mod cache;
mod error;
pub mod html;
mod record;
mod shortcode;

pub use args::ShortcodeArgs;
pub use cache::{CacheStats, MokaRenderCache, RenderCache, RenderCacheEntry};
pub use error::RenderError;
pub use record::{AssetRecord, RecordLookup, RecordSource, ShortcodeRecord};
pub use shortcode::ImageShortcodeHandler;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
