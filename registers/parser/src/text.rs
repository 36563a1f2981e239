// Licensed under the Apache-2.0 license

//! Text normalization for element content.
//!
//! The XML reader already resolves the five predefined XML entities. What is
//! left are entities that were escaped twice (`&amp;lt;`), HTML names such as
//! `&nbsp;`, and numeric references; those are decoded here before all
//! whitespace runs collapse to a single space.

use xmltree::Element;

/// Decode entities, then collapse whitespace runs and trim.
///
/// # Examples
/// ```
/// use svd2cpp_parser::text::normalize;
/// assert_eq!(normalize("  Pin\n\t 0   mode "), "Pin 0 mode");
/// assert_eq!(normalize("TX&amp;RX"), "TX&RX");
/// ```
pub fn normalize(text: &str) -> String {
    let decoded = decode_entities(text);
    let mut out = String::with_capacity(decoded.len());
    for word in decoded.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Normalized text content of an element, or an empty string.
pub fn element_text(element: &Element) -> String {
    element
        .get_text()
        .map(|text| normalize(&text))
        .unwrap_or_default()
}

/// Decode named and numeric character references. Unknown or malformed
/// references are left untouched.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').and_then(|semi| {
            decode_reference(&tail[1..semi]).map(|decoded| (decoded, semi))
        }) {
            Some((decoded, semi)) => {
                out.push(decoded);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "copy" => Some('\u{a9}'),
        "reg" => Some('\u{ae}'),
        "deg" => Some('\u{b0}'),
        "micro" => Some('\u{b5}'),
        "times" => Some('\u{d7}'),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(normalize("a  b\n\nc\td"), "a b c d");
        assert_eq!(normalize("\n   "), "");
        assert_eq!(normalize("single"), "single");
    }

    #[test]
    fn test_decode_named() {
        assert_eq!(decode_entities("a &lt; b &amp;&amp; c &gt; d"), "a < b && c > d");
        assert_eq!(decode_entities("&quot;x&quot; &apos;y&apos;"), "\"x\" 'y'");
    }

    #[test]
    fn test_decode_numeric() {
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn test_unknown_and_unterminated_left_alone() {
        assert_eq!(decode_entities("R&D"), "R&D");
        assert_eq!(decode_entities("&bogus; x"), "&bogus; x");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn test_nbsp_collapses_as_whitespace() {
        assert_eq!(normalize("Pin&nbsp;&nbsp;0"), "Pin 0");
    }
}
