//! Shortcode arguments
//!
//! `[image id="3" width="300" height="200" alt="Logo"]` parses to an ordered
//! attribute map. Order is kept because it is the order attributes appear in
//! the rendered tag.

use crate::error::RenderError;
use indexmap::IndexMap;
use ngi_fileid::ContentHash;
use serde::{Deserialize, Serialize};

const CACHE_KEY_PREFIX: &str = "image-shortcode-";

/// Ordered shortcode attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcodeArgs {
    attrs: IndexMap<String, String>,
}

impl ShortcodeArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an attribute appended (or replaced in place)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Remove an attribute, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.attrs.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Positive integer value of a dimension attribute
    ///
    /// Leading digits are read (`"300px"` is 300); anything that reads as
    /// zero is absent.
    #[must_use]
    pub fn dimension(&self, key: &str) -> Option<u32> {
        let value = self.get(key)?.trim();
        let digits = value
            .find(|c: char| !c.is_ascii_digit())
            .map_or(value, |end| &value[..end]);
        digits.parse().ok().filter(|&n: &u32| n > 0)
    }

    /// Render cache key for these arguments
    ///
    /// # Errors
    /// Returns error if the arguments cannot be serialized
    pub fn cache_key(&self) -> Result<String, RenderError> {
        let hash = ContentHash::compute_serializable(&self.attrs)?;
        Ok(format!("{CACHE_KEY_PREFIX}{}", hash.to_hex()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ShortcodeArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attrs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
