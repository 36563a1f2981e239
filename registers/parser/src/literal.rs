// Licensed under the Apache-2.0 license

//! Integer literal parsing.
//!
//! SVD files written by different vendors use C-flavoured literals freely, so
//! the accepted forms are, in priority order:
//!
//! - `0x`/`0X` hexadecimal
//! - `0b`/`0B` binary
//! - leading-zero octal (`0755`)
//! - decimal
//!
//! Trailing C unsigned/long suffixes (`U`, `L`, `UL`, `ull`, ...) are stripped
//! first.

/// Parse an integer literal, returning `None` if the text is empty or not a
/// literal in any of the accepted forms.
///
/// # Examples
/// ```
/// use svd2cpp_parser::literal::parse_u64;
/// assert_eq!(parse_u64("0x2000"), Some(8192));
/// assert_eq!(parse_u64("0b101"), Some(5));
/// assert_eq!(parse_u64("10UL"), Some(10));
/// assert_eq!(parse_u64("0755"), Some(493));
/// assert_eq!(parse_u64("not_a_number"), None);
/// ```
pub fn parse_u64(text: &str) -> Option<u64> {
    let text = text
        .trim()
        .trim_end_matches(|c: char| matches!(c, 'u' | 'U' | 'l' | 'L'));

    let (digits, radix) = if let Some(hex) = strip_prefix_ci(text, "0x") {
        (hex, 16)
    } else if let Some(bin) = strip_prefix_ci(text, "0b") {
        (bin, 2)
    } else if text.len() > 1 && text.starts_with('0') {
        (&text[1..], 8)
    } else {
        (text, 10)
    };

    // from_str_radix tolerates a leading sign, literals do not.
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    u64::from_str_radix(digits, radix).ok()
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}
