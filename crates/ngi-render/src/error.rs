//! Error types for shortcode rendering

use ngi_assets::{MaterializeError, StoreError};
use ngi_fileid::HashError;

/// Errors while rendering a shortcode
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Session grant for a cached origin failed
    #[error("grant failed: {0}")]
    Grant(#[from] StoreError),

    /// Arguments could not be fingerprinted
    #[error("could not fingerprint shortcode arguments: {0}")]
    Fingerprint(#[from] HashError),

    /// Resizing or deriving the record failed
    #[error("materialization failed: {0}")]
    Materialize(#[from] MaterializeError),

    /// Void elements cannot carry content
    #[error("<{0}> is a void element and cannot have content")]
    VoidContent(String),
}
