//! Variant names
//!
//! A variant name records the transform that produced a file:
//! the method name followed by its JSON-encoded arguments in base64, with `+`
//! and `/` swapped for `~` and `_` so the result is safe inside a path
//! segment.

use crate::error::FileIdError;
use base64::prelude::{Engine as _, BASE64_STANDARD_NO_PAD};
use serde::Serialize;

/// Variant name for `method` applied with `args`
///
/// # Errors
/// Returns error if `args` cannot be serialized to JSON
///
/// # Examples
/// `variant_name("ScaleWidth", &[100])` is `ScaleWidthWzEwMF0`.
pub fn variant_name<A>(method: &str, args: &A) -> Result<String, FileIdError>
where
    A: Serialize + ?Sized,
{
    let json = serde_json::to_vec(args)?;
    let encoded = BASE64_STANDARD_NO_PAD.encode(json);
    let mut name = String::with_capacity(method.len() + encoded.len());
    name.push_str(method);
    name.extend(encoded.chars().map(|c| match c {
        '+' => '~',
        '/' => '_',
        other => other,
    }));
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_width_name() {
        assert_eq!(variant_name("ScaleWidth", &[100]).unwrap(), "ScaleWidthWzEwMF0");
    }

    #[test]
    fn string_args() {
        assert_eq!(
            variant_name("ExtRewrite", &["png", "webp"]).unwrap(),
            "ExtRewriteWyJwbmciLCJ3ZWJwIl0"
        );
    }

    #[test]
    fn names_are_path_safe() {
        let name = variant_name("Raw", &["\u{fbff}?>", "~~~"]).unwrap();
        assert!(!name.contains(['+', '/', '=', '.']));
    }
}
