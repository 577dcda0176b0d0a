//! HTML tag building

use crate::error::RenderError;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Build one tag
///
/// Attributes with empty values are dropped, except `alt`. Void elements are
/// self-closed (`<img src="a.png" alt="" />`).
///
/// # Errors
/// Returns error if a void element is given content
pub fn create_tag<'a, I>(tag: &str, attributes: I, content: &str) -> Result<String, RenderError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let tag = tag.to_ascii_lowercase();
    let mut markup = format!("<{tag}");
    for (key, value) in attributes {
        if value.is_empty() && key != "alt" {
            continue;
        }
        markup.push(' ');
        markup.push_str(key);
        markup.push_str("=\"");
        markup.push_str(&escape_attribute(value));
        markup.push('"');
    }

    if VOID_ELEMENTS.contains(&tag.as_str()) {
        if !content.is_empty() {
            return Err(RenderError::VoidContent(tag));
        }
        markup.push_str(" />");
        return Ok(markup);
    }

    markup.push('>');
    markup.push_str(content);
    markup.push_str("</");
    markup.push_str(&tag);
    markup.push('>');
    Ok(markup)
}

/// Escape a value for use inside a double-quoted attribute
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_elements_self_close() {
        let tag = create_tag("source", [("srcset", "/a.webp"), ("type", "image/webp")], "").unwrap();
        assert_eq!(tag, r#"<source srcset="/a.webp" type="image/webp" />"#);
        assert!(matches!(create_tag("img", [("alt", "")], "x"), Err(RenderError::VoidContent(_))));
    }

    #[test]
    fn empty_attributes_dropped_except_alt() {
        let tag = create_tag("IMG", [("src", "/a.png"), ("alt", ""), ("class", "")], "").unwrap();
        assert_eq!(tag, r#"<img src="/a.png" alt="" />"#);
    }

    #[test]
    fn content_and_escaping() {
        let tag = create_tag("picture", [("title", r#"Tom & "Jerry""#)], "<img />").unwrap();
        assert_eq!(tag, r#"<picture title="Tom &amp; &quot;Jerry&quot;"><img /></picture>"#);
    }
}
