//! Resolving identifiers against a filesystem
//!
//! A [`TupleResolution`] knows which layouts a store may contain and finds
//! the concrete identifier behind a logical tuple, the original behind a
//! variant, and every variant stored next to an original.

use crate::error::FileIdError;
use crate::helper::{FileIdHelper, SchemeHelper};
use crate::tuple::FileTuple;
use tracing::trace;

/// Read-only view of the files a resolver looks at
pub trait Filesystem {
    /// Whether an identifier is present
    fn has(&self, file_id: &str) -> bool;

    /// Full content hash of a stored identifier
    fn content_hash(&self, file_id: &str) -> Option<String>;

    /// Every identifier below `folder`, recursively; `""` lists everything
    fn list(&self, folder: &str) -> Vec<String>;
}

/// Resolution of tuples to and from stored identifiers
pub trait TupleResolution: Send + Sync {
    /// Build the identifier a new file would be stored under
    ///
    /// # Errors
    /// Returns error if the tuple cannot be laid out
    fn build_file_id(&self, tuple: &FileTuple) -> Result<String, FileIdError>;

    /// Find the stored identifier for `tuple`
    ///
    /// With `strict`, a supplied hash must prefix the stored original's hash.
    fn search_for_tuple(&self, tuple: &FileTuple, fs: &dyn Filesystem, strict: bool) -> Option<FileTuple>;

    /// Identifier of the original a (possibly variant) identifier belongs to
    fn strip_variant(&self, file_id: &str) -> Option<FileTuple>;

    /// Decode an identifier under the first layout that understands it
    fn parse_file_id(&self, file_id: &str) -> Option<FileTuple>;

    /// Every stored identifier that is a variant of `original`
    fn find_variants(&self, original: &FileTuple, fs: &dyn Filesystem) -> Vec<FileTuple>;
}

/// Resolution over a default layout plus ordered fallback layouts
#[derive(Debug, Clone)]
pub struct FileIdHelperResolutionStrategy {
    default_helper: SchemeHelper,
    resolution_helpers: Vec<SchemeHelper>,
}

impl FileIdHelperResolutionStrategy {
    /// New files use `default_helper`; lookups try `resolution_helpers` in order
    #[must_use]
    pub fn new(default_helper: SchemeHelper, resolution_helpers: Vec<SchemeHelper>) -> Self {
        Self {
            default_helper,
            resolution_helpers,
        }
    }

    /// Strategy that only knows one layout
    #[must_use]
    pub fn single(helper: SchemeHelper) -> Self {
        Self::new(helper.clone(), vec![helper])
    }

    #[must_use]
    pub fn default_helper(&self) -> &SchemeHelper {
        &self.default_helper
    }

    #[must_use]
    pub fn resolution_helpers(&self) -> &[SchemeHelper] {
        &self.resolution_helpers
    }

    /// Default helper first, then each resolution helper not already seen
    fn all_helpers(&self) -> Vec<&SchemeHelper> {
        let mut helpers = vec![&self.default_helper];
        for helper in &self.resolution_helpers {
            if !helpers.contains(&helper) {
                helpers.push(helper);
            }
        }
        helpers
    }

    fn hash_matches(helper: &SchemeHelper, tuple: &FileTuple, fs: &dyn Filesystem) -> Option<String> {
        let original_id = helper.build_file_id(tuple.filename(), tuple.hash(), "").ok()?;
        let stored = fs.content_hash(&original_id)?;
        stored.starts_with(tuple.hash()).then_some(stored)
    }
}

impl TupleResolution for FileIdHelperResolutionStrategy {
    fn build_file_id(&self, tuple: &FileTuple) -> Result<String, FileIdError> {
        self.default_helper
            .build_file_id(tuple.filename(), tuple.hash(), tuple.variant())
    }

    fn search_for_tuple(&self, tuple: &FileTuple, fs: &dyn Filesystem, strict: bool) -> Option<FileTuple> {
        for helper in &self.resolution_helpers {
            let Ok(file_id) = helper.build_file_id(tuple.filename(), tuple.hash(), tuple.variant()) else {
                continue;
            };
            if !fs.has(&file_id) {
                continue;
            }

            let hash = if strict && !tuple.hash().is_empty() {
                match Self::hash_matches(helper, tuple, fs) {
                    Some(stored) => stored,
                    None => {
                        trace!(%file_id, "stored hash does not match");
                        continue;
                    }
                }
            } else {
                fs.content_hash(&file_id)
                    .unwrap_or_else(|| tuple.hash().to_string())
            };

            return Some(tuple.clone().with_hash(hash).with_file_id(file_id));
        }
        None
    }

    fn strip_variant(&self, file_id: &str) -> Option<FileTuple> {
        for helper in self.all_helpers() {
            let Some(parsed) = helper.parse_file_id(file_id) else {
                continue;
            };
            if let Ok(original) = helper.build_tuple(&parsed.with_variant("")) {
                return Some(original);
            }
        }
        None
    }

    fn parse_file_id(&self, file_id: &str) -> Option<FileTuple> {
        self.all_helpers()
            .into_iter()
            .find_map(|helper| helper.parse_file_id(file_id))
    }

    fn find_variants(&self, original: &FileTuple, fs: &dyn Filesystem) -> Vec<FileTuple> {
        let mut found: Vec<FileTuple> = Vec::new();
        for helper in self.all_helpers() {
            sweep(helper, original, fs, &mut found);
        }
        found
    }
}

/// Collect identifiers under `helper`'s variant folder that are variants of `original`
pub(crate) fn sweep(helper: &SchemeHelper, original: &FileTuple, fs: &dyn Filesystem, found: &mut Vec<FileTuple>) {
    let folder = helper.look_for_variant_in(original);
    for file_id in fs.list(&folder) {
        if !helper.is_variant_of(&file_id, original) {
            continue;
        }
        if found.iter().any(|tuple| tuple.file_id() == file_id) {
            continue;
        }
        if let Some(parsed) = helper.parse_file_id(&file_id) {
            found.push(parsed.with_hash(original.hash()));
        }
    }
}
