//! Addressing-scheme capability
//!
//! Defines the [`FileIdHelper`] trait and the closed set of schemes that
//! implement it. The scheme is picked once, when the host store is
//! configured; nothing guesses at it per call.

use crate::derived::DerivedFormat;
use crate::error::FileIdError;
use crate::hash_helper::HashFileIdHelper;
use crate::natural_helper::NaturalFileIdHelper;
use crate::tuple::FileTuple;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

/// Parse/build/clean/truncate rules for one identifier layout
///
/// This trait is **sealed**: the two layouts are [`HashFileIdHelper`] and
/// [`NaturalFileIdHelper`], each in a base or derived-format-aware flavour.
///
/// # Contract
/// - `parse_file_id` returns `None` for identifiers of another shape; it
///   never errors
/// - `parse_file_id(build_file_id(t))` reproduces `t` for every tuple
///   `build_file_id` accepts (hash truncated for the hash layout)
/// - the derived-format-aware flavour only builds filenames carrying its suffix
pub trait FileIdHelper: private::Sealed + Debug + Send + Sync {
    /// Layout implemented by this helper
    fn scheme(&self) -> AddressingScheme;

    /// Derived format this helper is aware of, if any
    fn derived_format(&self) -> Option<&DerivedFormat>;

    /// Strip constructs that would clash with the layout
    fn clean_filename(&self, filename: &str) -> String;

    /// Build the identifier for a (filename, hash, variant) triple
    ///
    /// # Errors
    /// Returns error if the triple cannot be laid out unambiguously
    fn build_file_id(&self, filename: &str, hash: &str, variant: &str) -> Result<String, FileIdError>;

    /// Decode an identifier, or `None` if it does not fit this layout
    fn parse_file_id(&self, file_id: &str) -> Option<FileTuple>;

    /// Hash as it appears inside identifiers of this layout
    fn truncate<'a>(&self, hash: &'a str) -> &'a str;

    /// Folder in which variants of `original` are stored
    fn look_for_variant_in(&self, original: &FileTuple) -> String;

    /// Build the identifier for `tuple` and attach it
    ///
    /// # Errors
    /// Returns error if the tuple cannot be laid out unambiguously
    fn build_tuple(&self, tuple: &FileTuple) -> Result<FileTuple, FileIdError> {
        let file_id = self.build_file_id(tuple.filename(), tuple.hash(), tuple.variant())?;
        Ok(tuple.clone().with_file_id(file_id))
    }

    /// Whether `file_id` denotes a variant of `original`
    ///
    /// For the derived-format-aware flavour the candidate must carry the
    /// suffix, and its filename is compared with the suffix removed.
    fn is_variant_of(&self, file_id: &str, original: &FileTuple) -> bool {
        let Some(parsed) = self.parse_file_id(file_id) else {
            return false;
        };
        let filename = match self.derived_format() {
            Some(format) => format.strip(parsed.filename()),
            None => parsed.filename(),
        };
        filename == original.filename() && parsed.hash() == self.truncate(original.hash())
    }
}

pub(crate) mod private {
    /// Sealed trait marker
    pub trait Sealed {}
}

/// Identifier layout used by a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressingScheme {
    /// `<folder>/<hash10>/<name>[__<variant>]<ext>`
    #[default]
    Hash,
    /// `<folder>/<name>[__<variant>]<ext>`
    Natural,
}

impl AddressingScheme {
    /// Both schemes, hash-addressed first
    pub const ALL: [Self; 2] = [Self::Hash, Self::Natural];

    /// Base helper for this scheme
    #[must_use]
    pub fn helper(self) -> SchemeHelper {
        match self {
            Self::Hash => SchemeHelper::Hash(HashFileIdHelper::new()),
            Self::Natural => SchemeHelper::Natural(NaturalFileIdHelper::new()),
        }
    }

    /// Derived-format-aware helper for this scheme
    #[must_use]
    pub fn derived_helper(self, format: DerivedFormat) -> SchemeHelper {
        match self {
            Self::Hash => SchemeHelper::Hash(HashFileIdHelper::derived(format)),
            Self::Natural => SchemeHelper::Natural(NaturalFileIdHelper::derived(format)),
        }
    }
}

impl Display for AddressingScheme {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash => f.write_str("hash"),
            Self::Natural => f.write_str("natural"),
        }
    }
}

impl FromStr for AddressingScheme {
    type Err = FileIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hash" => Ok(Self::Hash),
            "natural" => Ok(Self::Natural),
            other => Err(FileIdError::UnknownScheme(other.to_string())),
        }
    }
}

/// One of the two layouts, dispatched statically
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemeHelper {
    Hash(HashFileIdHelper),
    Natural(NaturalFileIdHelper),
}

impl SchemeHelper {
    fn inner(&self) -> &dyn FileIdHelper {
        match self {
            Self::Hash(helper) => helper,
            Self::Natural(helper) => helper,
        }
    }
}

impl private::Sealed for SchemeHelper {}

impl FileIdHelper for SchemeHelper {
    fn scheme(&self) -> AddressingScheme {
        self.inner().scheme()
    }

    fn derived_format(&self) -> Option<&DerivedFormat> {
        self.inner().derived_format()
    }

    fn clean_filename(&self, filename: &str) -> String {
        self.inner().clean_filename(filename)
    }

    fn build_file_id(&self, filename: &str, hash: &str, variant: &str) -> Result<String, FileIdError> {
        self.inner().build_file_id(filename, hash, variant)
    }

    fn parse_file_id(&self, file_id: &str) -> Option<FileTuple> {
        self.inner().parse_file_id(file_id)
    }

    fn truncate<'a>(&self, hash: &'a str) -> &'a str {
        self.inner().truncate(hash)
    }

    fn look_for_variant_in(&self, original: &FileTuple) -> String {
        self.inner().look_for_variant_in(original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_round_trips_through_str() {
        for scheme in AddressingScheme::ALL {
            assert_eq!(scheme.to_string().parse::<AddressingScheme>().unwrap(), scheme);
        }
        assert!(matches!("flat".parse::<AddressingScheme>(), Err(FileIdError::UnknownScheme(_))));
    }

    #[test]
    fn scheme_deserializes_lowercase() {
        let scheme: AddressingScheme = serde_json::from_str("\"natural\"").unwrap();
        assert_eq!(scheme, AddressingScheme::Natural);
    }

    #[test]
    fn dispatch_reports_scheme_and_flavour() {
        let helper = AddressingScheme::Natural.derived_helper(DerivedFormat::webp());
        assert_eq!(helper.scheme(), AddressingScheme::Natural);
        assert_eq!(helper.derived_format().map(DerivedFormat::suffix), Some(".webp"));
        assert!(AddressingScheme::Hash.helper().derived_format().is_none());
    }

    #[test]
    fn base_hash_helper_variant_check() {
        let helper = AddressingScheme::Hash.helper();
        let original = FileTuple::new("folder/logo.png", "abc1234567ffffffff", "");
        assert!(helper.is_variant_of("folder/abc1234567/logo__ResizedImageWzEwLDEwXQ.png", &original));
        assert!(helper.is_variant_of("folder/abc1234567/logo.png", &original));
        assert!(!helper.is_variant_of("folder/abc1234568/logo__v.png", &original));
        assert!(!helper.is_variant_of("folder/abc1234567/logo__v.png.webp", &original));
    }
}
