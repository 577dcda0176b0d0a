//! NGI Assets
//!
//! Derived-format variant materialization over an asset store.
//!
//! # Core Concepts
//!
//! - [`AssetStore`]: Persistent storage keyed by (filename, hash, variant)
//! - [`ImageBackend`]: A decoded image that can encode, resize and write itself
//! - [`ManipulationOwner`]: A stored file variants are generated from
//! - [`Materializer`]: Finds or generates variants, at most once per key
//! - [`DerivedHandle`]: A materialized variant, itself an owner for chaining
//! - [`NextGenConfig`]: Configuration loaded once at start-up
//!
//! # Example
//!
//! ```rust,ignore
//! let materializer = Materializer::new(store, &NextGenConfig::default())?;
//! if let Some(Derived::Generated(handle)) = materializer.derived_format(&mut image)? {
//!     println!("webp: {}", handle.tuple());
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod backend;
mod config;
mod error;
mod handle;
mod materializer;
mod owner;
mod store;

pub use backend::{BackendLoader, DerivedFormatBackend, Encoded, ImageBackend};
pub use config::{DerivedFormatConfig, NextGenConfig, RenderConfig};
pub use error::{CodecError, ConfigError, MaterializeError, StoreError};
pub use handle::DerivedHandle;
pub use materializer::{Derived, Manipulated, Materializer};
pub use owner::ManipulationOwner;
pub use store::{AssetStore, Conflict, Visibility, WriteConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
