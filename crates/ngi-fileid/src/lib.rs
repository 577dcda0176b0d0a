//! NGI File Identifiers
//!
//! Content-addressed file identifiers with derived-format (WebP) variants.
//!
//! # Core Concepts
//!
//! - [`FileTuple`]: Decoded (filename, hash, variant) form of an identifier
//! - [`FileIdHelper`]: Parse/build/clean rules for one addressing scheme
//! - [`DerivedFormat`]: Suffix marking a re-encoded copy (`.webp`)
//! - [`TupleResolution`]: Finding originals and variants in a filesystem
//! - [`variant_name`]: Transform name plus encoded arguments
//!
//! # Example
//!
//! ```rust
//! use ngi_fileid::{AddressingScheme, DerivedFormat, FileIdHelper};
//!
//! let helper = AddressingScheme::Hash.derived_helper(DerivedFormat::webp());
//! let tuple = helper
//!     .parse_file_id("folder/abc1234567/wbg-logo__ScaleWidthWzEwMF0.png.webp")
//!     .unwrap();
//! assert_eq!(tuple.filename(), "folder/wbg-logo.png.webp");
//! assert_eq!(tuple.hash(), "abc1234567");
//! assert_eq!(tuple.variant(), "ScaleWidthWzEwMF0");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod derived;
mod derived_resolution;
mod error;
mod hash;
mod hash_helper;
mod helper;
mod layout;
mod natural_helper;
mod resolution;
mod tuple;
mod variant;

pub use derived::DerivedFormat;
pub use derived_resolution::DerivedFormatResolution;
pub use error::FileIdError;
pub use hash::{is_truncated_hash, truncate_hash, ContentHash, HashError, HASH_TRUNCATE_LENGTH};
pub use hash_helper::HashFileIdHelper;
pub use helper::{AddressingScheme, FileIdHelper, SchemeHelper};
pub use natural_helper::{NaturalFileIdHelper, RESAMPLED_FOLDER};
pub use resolution::{FileIdHelperResolutionStrategy, Filesystem, TupleResolution};
pub use tuple::FileTuple;
pub use variant::variant_name;

/// Commonly used items
pub mod prelude {
    pub use crate::{
        AddressingScheme, DerivedFormat, FileIdHelper, FileTuple, Filesystem, SchemeHelper,
        TupleResolution,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
