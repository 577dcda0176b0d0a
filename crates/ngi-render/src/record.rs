//! Records a shortcode can point at
//!
//! [`ShortcodeRecord`] is what the renderer needs from a file record;
//! [`AssetRecord`] provides it for any [`ManipulationOwner`] backed by a
//! [`Materializer`].

use crate::args::ShortcodeArgs;
use crate::error::RenderError;
use ngi_assets::{Derived, ManipulationOwner, Materializer};
use std::fmt::Debug;
use std::sync::Arc;

/// A file record as seen by the shortcode renderer
pub trait ShortcodeRecord: Send + Debug {
    fn exists(&self) -> bool;

    /// Whether resizing and derived formats apply
    fn is_image(&self) -> bool;

    /// Title, used as alt text for error records
    fn title(&self) -> &str;

    /// (filename, hash) of the stored file, for session grants
    fn origin(&self) -> Option<(String, String)>;

    fn url(&self, grant: bool) -> Option<String>;

    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Whether the record's file already is in the derived format
    fn is_derived_format(&self) -> bool;

    /// Resized copy of the record, or none if it cannot be resized
    ///
    /// # Errors
    /// Returns error if resizing was attempted and failed
    fn resized(&mut self, width: u32, height: u32) -> Result<Option<Box<dyn ShortcodeRecord>>, RenderError>;

    /// URL of the derived-format copy, generating it if needed
    ///
    /// # Errors
    /// Returns error if generation was attempted and failed
    fn derived_url(&mut self, grant: bool) -> Result<Option<String>, RenderError>;
}

/// Outcome of looking up the record for a shortcode
#[derive(Debug)]
pub enum RecordLookup {
    Found(Box<dyn ShortcodeRecord>),
    /// No usable record; the HTTP-style status explains why (404, 403)
    Error(u16),
}

/// Where shortcode records come from
pub trait RecordSource: Send + Sync {
    fn find(&self, args: &ShortcodeArgs) -> RecordLookup;

    /// Placeholder record rendered in place of a missing one
    fn find_error_record(&self, code: u16) -> Option<Box<dyn ShortcodeRecord>>;
}

/// [`ShortcodeRecord`] over an owner stored through a [`Materializer`]
#[derive(Debug)]
pub struct AssetRecord<O> {
    owner: O,
    title: String,
    is_image: bool,
    materializer: Arc<Materializer>,
}

impl<O> AssetRecord<O>
where
    O: ManipulationOwner + Send + Debug + 'static,
{
    /// Image record
    pub fn image(owner: O, title: impl Into<String>, materializer: Arc<Materializer>) -> Self {
        Self {
            owner,
            title: title.into(),
            is_image: true,
            materializer,
        }
    }

    /// Non-image file record: never resized or derived
    pub fn file(owner: O, title: impl Into<String>, materializer: Arc<Materializer>) -> Self {
        Self {
            is_image: false,
            ..Self::image(owner, title, materializer)
        }
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }
}

fn url_of(materializer: &Materializer, owner: &dyn ManipulationOwner, grant: bool) -> Option<String> {
    materializer
        .store()
        .url(owner.filename(), owner.hash(), owner.variant(), grant)
}

impl<O> ShortcodeRecord for AssetRecord<O>
where
    O: ManipulationOwner + Send + Debug + 'static,
{
    fn exists(&self) -> bool {
        self.owner.exists()
    }

    fn is_image(&self) -> bool {
        self.is_image
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn origin(&self) -> Option<(String, String)> {
        if self.owner.filename().is_empty() {
            return None;
        }
        Some((self.owner.filename().to_string(), self.owner.hash().to_string()))
    }

    fn url(&self, grant: bool) -> Option<String> {
        url_of(&self.materializer, &self.owner, grant)
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.owner.dimensions()
    }

    fn is_derived_format(&self) -> bool {
        self.owner.is_derived_format(self.materializer.format())
    }

    fn resized(&mut self, width: u32, height: u32) -> Result<Option<Box<dyn ShortcodeRecord>>, RenderError> {
        if !self.is_image {
            return Ok(None);
        }
        let Some(handle) = self.materializer.resize(&mut self.owner, width, height)? else {
            return Ok(None);
        };
        Ok(Some(Box::new(AssetRecord::image(
            handle,
            self.title.clone(),
            Arc::clone(&self.materializer),
        ))))
    }

    fn derived_url(&mut self, grant: bool) -> Result<Option<String>, RenderError> {
        if !self.is_image {
            return Ok(None);
        }
        let materializer = Arc::clone(&self.materializer);
        let url = match materializer.derived_format(&mut self.owner)? {
            Some(Derived::Original(owner)) => url_of(&materializer, owner, grant),
            Some(Derived::Generated(handle)) => url_of(&materializer, &handle, grant),
            None => None,
        };
        Ok(url)
    }
}
