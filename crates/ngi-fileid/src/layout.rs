//! Positional layout shared by both addressing schemes
//!
//! `<folder>/[<hash>/]<name>[__<variant>]<extension>[<derived suffix>]`
//!
//! The extension starts at the first `.` of the basename, so a derived
//! filename like `logo.png.webp` keeps `.png.webp` together and the variant
//! always lands before it.

use crate::derived::DerivedFormat;
use crate::error::FileIdError;
use crate::tuple::FileTuple;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

pub(crate) const VARIANT_DELIMITER: &str = "__";

static REPEATED_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new("_{2,}").expect("static pattern compiles"));

/// A filename split into the pieces an identifier is composed from
#[derive(Debug, Clone, Copy)]
pub(crate) struct SplitName<'a> {
    /// Folder including its trailing slash, or empty
    pub(crate) folder: &'a str,
    pub(crate) name: &'a str,
    pub(crate) extension: &'a str,
}

/// Scheme-independent filename cleaning
pub(crate) fn clean(filename: &str, derived: Option<&DerivedFormat>) -> String {
    let slashed = filename.replace('\\', "/");
    let cleaned = REPEATED_UNDERSCORES.replace_all(&slashed, "_");
    match derived {
        Some(format) => format.strip_all(&cleaned).to_string(),
        None => cleaned.into_owned(),
    }
}

/// A derived helper only composes names that carry its suffix
pub(crate) fn require_suffix(derived: Option<&DerivedFormat>, filename: &str) -> Result<(), FileIdError> {
    match derived {
        Some(format) if !format.is_derived(filename) => {
            Err(FileIdError::invalid_filename(filename, "missing derived-format suffix"))
        }
        _ => Ok(()),
    }
}

/// Split and validate a filename for composition with `variant`
pub(crate) fn split<'a>(filename: &'a str, variant: &str) -> Result<SplitName<'a>, FileIdError> {
    if filename.is_empty() {
        return Err(FileIdError::EmptyFilename);
    }

    let (folder, basename) = match filename.rfind('/') {
        Some(idx) => filename.split_at(idx + 1),
        None => ("", filename),
    };
    if folder.starts_with('/') || folder.contains("//") {
        return Err(FileIdError::invalid_filename(filename, "folder has an empty segment"));
    }

    let (name, extension) = match basename.find('.') {
        Some(idx) => basename.split_at(idx),
        None => (basename, ""),
    };
    if name.is_empty() {
        return Err(FileIdError::invalid_filename(filename, "basename is empty"));
    }
    if name.contains(VARIANT_DELIMITER) {
        return Err(FileIdError::invalid_filename(filename, "basename contains the variant delimiter"));
    }
    if extension == "." {
        return Err(FileIdError::invalid_filename(filename, "extension is empty"));
    }

    if !variant.is_empty() {
        if variant.contains(['.', '/']) || variant.starts_with('_') {
            return Err(FileIdError::InvalidVariant(variant.to_string()));
        }
        if name.ends_with('_') {
            return Err(FileIdError::invalid_filename(filename, "basename ends with '_' before a variant"));
        }
    }

    Ok(SplitName {
        folder,
        name,
        extension,
    })
}

/// Compose an identifier from validated pieces
pub(crate) fn compose(split: &SplitName<'_>, hash_segment: Option<&str>, variant: &str) -> String {
    let mut file_id = String::with_capacity(
        split.folder.len() + split.name.len() + split.extension.len() + variant.len() + 16,
    );
    file_id.push_str(split.folder);
    if let Some(hash) = hash_segment {
        file_id.push_str(hash);
        file_id.push('/');
    }
    file_id.push_str(split.name);
    if !variant.is_empty() {
        file_id.push_str(VARIANT_DELIMITER);
        file_id.push_str(variant);
    }
    file_id.push_str(split.extension);
    file_id
}

/// Rebuild a tuple from the named groups of a scheme pattern
pub(crate) fn tuple_from_captures(caps: &Captures<'_>, file_id: &str) -> FileTuple {
    let filename = format!(
        "{}{}{}",
        group(caps, "folder"),
        group(caps, "basename"),
        group(caps, "extension")
    );
    FileTuple::new(filename, group(caps, "hash"), group(caps, "variant")).with_file_id(file_id)
}

fn group<'h>(caps: &Captures<'h>, name: &str) -> &'h str {
    caps.name(name).map_or("", |m| m.as_str())
}

/// Parse under a base layout, honouring the derived-format extension
///
/// The derived-aware parse only accepts identifiers ending in the suffix. The
/// suffix is stripped, the remainder parsed as an ordinary identifier, and
/// the suffix re-appended to the filename.
pub(crate) fn parse_with(
    derived: Option<&DerivedFormat>,
    file_id: &str,
    parse_layout: impl Fn(&str) -> Option<FileTuple>,
) -> Option<FileTuple> {
    let Some(format) = derived else {
        return parse_layout(file_id);
    };
    if !format.is_derived(file_id) {
        return None;
    }
    let base = parse_layout(format.strip(file_id))?;
    let filename = format.append(base.filename());
    Some(base.with_filename(filename).with_file_id(file_id))
}

/// Folder of a filename, without trailing slash
pub(crate) fn dirname(filename: &str) -> &str {
    filename.rfind('/').map_or("", |idx| &filename[..idx])
}
