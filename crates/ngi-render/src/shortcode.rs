//! Image shortcode rendering
//!
//! Renders `[image ...]` shortcodes as `<picture>` markup with a
//! derived-format `<source>`, caching the markup by argument fingerprint.

use crate::args::ShortcodeArgs;
use crate::cache::{RenderCache, RenderCacheEntry};
use crate::error::RenderError;
use crate::html::create_tag;
use crate::record::{RecordLookup, RecordSource, ShortcodeRecord};
use indexmap::IndexMap;
use ngi_assets::{AssetStore, RenderConfig};
use ngi_fileid::DerivedFormat;
use std::sync::Arc;
use tracing::{debug, trace};

/// Renders image shortcodes through a cache
pub struct ImageShortcodeHandler {
    cache: Arc<dyn RenderCache>,
    source: Arc<dyn RecordSource>,
    store: Arc<dyn AssetStore>,
    config: RenderConfig,
    mime_type: String,
}

impl ImageShortcodeHandler {
    /// `format` must be the one the record source materializes, its MIME
    /// type is announced on the `<source>` element
    pub fn new(
        cache: Arc<dyn RenderCache>,
        source: Arc<dyn RecordSource>,
        store: Arc<dyn AssetStore>,
        config: RenderConfig,
        format: &DerivedFormat,
    ) -> Self {
        Self {
            cache,
            source,
            store,
            config,
            mime_type: format.mime_type().to_string(),
        }
    }

    /// Render one shortcode
    ///
    /// Returns `Ok(None)` when neither the record nor an error record exists.
    ///
    /// # Errors
    /// Returns error if a session grant, resize or derived-format generation fails
    pub fn handle(&self, args: &ShortcodeArgs) -> Result<Option<String>, RenderError> {
        let grant = self.config.allow_session_grant;
        let key = args.cache_key()?;

        if let Some(entry) = self.cache.get(&key) {
            trace!(%key, "render cache hit");
            if grant {
                if let Some((filename, hash)) = entry.origin() {
                    self.store.grant(filename, hash)?;
                }
            }
            return Ok(Some(entry.markup));
        }

        let (mut record, found) = match self.source.find(args) {
            RecordLookup::Found(record) => (record, true),
            RecordLookup::Error(code) => match self.source.find_error_record(code) {
                Some(record) => {
                    debug!(code, "rendering error record");
                    (record, false)
                }
                None => return Ok(None),
            },
        };

        let mut src = record.url(grant).unwrap_or_default();
        let mut resized: Option<Box<dyn ShortcodeRecord>> = None;
        let (mut width, mut height) = (None, None);
        if record.is_image() {
            width = args.dimension("width");
            height = args.dimension("height");
            if let (Some(w), Some(h)) = (width, height) {
                if record.dimensions() != Some((w, h)) {
                    resized = record.resized(w, h)?;
                    if let Some(url) = resized.as_ref().and_then(|r| r.url(grant)) {
                        src = url;
                    }
                }
            }
        }

        let mut args = args.clone();
        if self.config.lazy_loading {
            update_loading(&mut args, width, height);
        }

        let mut img: IndexMap<&str, String> = IndexMap::new();
        img.insert("src", String::new());
        img.insert("alt", String::new());
        for (key, value) in args.iter() {
            img.insert(key, value.to_string());
        }
        img.insert("id", String::new());
        img.insert("src", src);
        if !found {
            img.insert("alt", record.title().to_string());
        }
        img.retain(|key, value| !value.trim().is_empty() || *key == "alt");
        let img_tag = create_tag("img", img.iter().map(|(k, v)| (*k, v.as_str())), "")?;

        let derived_url = if !record.is_derived_format() && record.exists() {
            match resized.as_deref_mut() {
                Some(resized) => resized.derived_url(grant)?,
                None => record.derived_url(grant)?,
            }
        } else {
            None
        };
        let markup = match derived_url {
            Some(srcset) => {
                let source = create_tag(
                    "source",
                    [("srcset", srcset.as_str()), ("type", self.mime_type.as_str())],
                    "",
                )?;
                create_tag("picture", std::iter::empty::<(&str, &str)>(), &format!("{source}{img_tag}"))?
            }
            None => img_tag,
        };

        if found {
            let mut entry = RenderCacheEntry::new(markup.clone());
            if let Some((filename, hash)) = record.origin() {
                entry = entry.with_origin(filename, hash);
            }
            self.cache.set(&key, entry);
        }
        Ok(Some(markup))
    }
}

/// Lazy-load when dimensions are known; `loading="eager"` means browser default
fn update_loading(args: &mut ShortcodeArgs, width: Option<u32>, height: Option<u32>) {
    if args.get("loading") == Some("eager") {
        args.remove("loading");
    } else if width.is_some() && height.is_some() {
        args.set("loading", "lazy");
    }
}
