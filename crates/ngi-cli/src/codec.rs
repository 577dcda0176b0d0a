//! Identifier operations for one configured layout

use anyhow::{anyhow, Context, Result};
use ngi_assets::NextGenConfig;
use ngi_fileid::{
    variant_name, AddressingScheme, DerivedFormatResolution, FileIdHelper, FileIdHelperResolutionStrategy, FileTuple,
    SchemeHelper, TupleResolution,
};
use serde_json::Value;
use tracing::debug;

/// Builds with the configured scheme; parses identifiers of either scheme
#[derive(Debug)]
pub(crate) struct Codec {
    base: SchemeHelper,
    derived: SchemeHelper,
    resolver: DerivedFormatResolution,
}

impl Codec {
    pub(crate) fn new(config: &NextGenConfig) -> Result<Self> {
        let format = config.derived_format.format()?;
        let scheme = config.addressing;
        let schemes: Vec<AddressingScheme> = std::iter::once(scheme)
            .chain(AddressingScheme::ALL.into_iter().filter(|other| *other != scheme))
            .collect();
        let helpers = schemes.iter().copied().map(AddressingScheme::helper).collect();
        let strategy = FileIdHelperResolutionStrategy::new(scheme.helper(), helpers);
        debug!(%scheme, extension = format.extension(), "codec ready");
        Ok(Self {
            base: scheme.helper(),
            derived: scheme.derived_helper(format.clone()),
            resolver: DerivedFormatResolution::new(strategy, format).with_schemes(&schemes),
        })
    }

    /// Derived names go through the derived helper, everything else through the base one
    fn helper_for(&self, filename: &str) -> &SchemeHelper {
        if self.resolver.format().is_derived(filename) {
            &self.derived
        } else {
            &self.base
        }
    }

    pub(crate) fn parse(&self, file_id: &str) -> Result<FileTuple> {
        self.resolver
            .parse_file_id(file_id)
            .ok_or_else(|| anyhow!("unrecognised file id '{file_id}'"))
    }

    pub(crate) fn build(&self, filename: &str, hash: &str, variant: &str) -> Result<String> {
        let tuple = FileTuple::new(filename, hash, variant);
        self.helper_for(filename)
            .build_file_id(filename, hash, variant)
            .with_context(|| format!("cannot build a file id for {tuple}"))
    }

    pub(crate) fn strip_variant(&self, file_id: &str) -> Result<FileTuple> {
        self.resolver
            .strip_variant(file_id)
            .ok_or_else(|| anyhow!("unrecognised file id '{file_id}'"))
    }

    pub(crate) fn is_variant(&self, file_id: &str, filename: &str, hash: &str) -> bool {
        self.resolver.is_variant_of(file_id, &FileTuple::new(filename, hash, ""))
    }

    pub(crate) fn clean(&self, filename: &str) -> String {
        self.derived.clean_filename(filename)
    }
}

/// Variant tag for `method` called with a JSON argument list
pub(crate) fn variant(method: &str, args: &str) -> Result<String> {
    let args: Value = serde_json::from_str(args).with_context(|| format!("arguments are not JSON: {args}"))?;
    Ok(variant_name(method, &args)?)
}
