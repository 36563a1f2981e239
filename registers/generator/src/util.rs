// Licensed under the Apache-2.0 license

//! Identifier sanitization, integer type selection, and formatting helpers.
//!
//! Every name that reaches the generated C++ (peripheral, register, field,
//! and the file/namespace/guard names derived from them) goes through
//! [`sanitize_identifier`], so the same input always maps to the same
//! identifier.

use crate::config::ReservedWords;

/// Placeholder used when a name sanitizes to nothing.
pub const UNNAMED: &str = "unnamed";

/// Turns an arbitrary name into a valid, non-reserved C++ identifier.
///
/// Rules, applied in order:
/// - every character outside `[A-Za-z0-9_]` becomes `_`
/// - a leading digit gets a `_` prefix
/// - an empty result becomes [`UNNAMED`]
/// - a reserved word gets a trailing `_`
/// - a leading `_` followed by an uppercase letter is dropped
///
/// # Examples
/// ```
/// use svd2cpp_generator::config::ReservedWords;
/// use svd2cpp_generator::util::sanitize_identifier;
/// let cpp = ReservedWords::cpp();
/// assert_eq!(sanitize_identifier("GPIO-A.MODE", &cpp), "GPIO_A_MODE");
/// assert_eq!(sanitize_identifier("3V3_EN", &cpp), "_3V3_EN");
/// assert_eq!(sanitize_identifier("delete", &cpp), "delete_");
/// assert_eq!(sanitize_identifier("_CTRL", &cpp), "CTRL");
/// ```
pub fn sanitize_identifier(name: &str, reserved: &ReservedWords) -> String {
    let mut result: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    if result.is_empty() {
        result = UNNAMED.to_string();
    }
    if reserved.contains(&result) {
        result.push('_');
    }
    let mut chars = result.chars();
    if let (Some('_'), Some(next)) = (chars.next(), chars.next()) {
        if next.is_ascii_uppercase() {
            result.remove(0);
        }
    }
    result
}

/// Fixed-width unsigned integer types available to the generated code.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum IntType {
    U8,
    U16,
    U32,
    U64,
}

impl IntType {
    /// The narrowest type holding `bits` bits, or `None` above 64.
    pub fn for_width(bits: u32) -> Option<IntType> {
        match bits {
            0..=8 => Some(IntType::U8),
            9..=16 => Some(IntType::U16),
            17..=32 => Some(IntType::U32),
            33..=64 => Some(IntType::U64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            IntType::U8 => 8,
            IntType::U16 => 16,
            IntType::U32 => 32,
            IntType::U64 => 64,
        }
    }

    pub fn cpp_name(self) -> &'static str {
        match self {
            IntType::U8 => "uint8_t",
            IntType::U16 => "uint16_t",
            IntType::U32 => "uint32_t",
            IntType::U64 => "uint64_t",
        }
    }
}

/// How a register's raw value is represented.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RawRepr {
    /// A single integer exactly as wide as the register.
    Int(IntType),
    /// A byte array of the given length (wide or odd-sized registers).
    Bytes(u32),
}

impl RawRepr {
    /// Registers of 1, 2, 4 or 8 bytes map onto an integer; anything else is
    /// a byte array so that the declared size is kept exactly.
    pub fn for_size(size_bytes: u32) -> RawRepr {
        match size_bytes {
            1 | 2 | 4 | 8 => IntType::for_width(size_bytes * 8)
                .map(RawRepr::Int)
                .unwrap_or(RawRepr::Bytes(size_bytes)),
            _ => RawRepr::Bytes(size_bytes),
        }
    }
}

/// `0x` followed by at least `digits` uppercase hex digits.
pub fn hex_literal(value: u64, digits: usize) -> String {
    format!("0x{value:0digits$X}")
}

/// Unsigned C++ integer literal for an address.
pub fn address_literal(address: u64) -> String {
    if address > u32::MAX as u64 {
        format!("{}ULL", hex_literal(address, 16))
    } else {
        format!("{}U", hex_literal(address, 8))
    }
}

/// Makes text safe to place inside a `/* ... */` comment.
pub fn comment_text(text: &str) -> String {
    text.replace("*/", "* /")
}
