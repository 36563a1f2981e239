// Licensed under the Apache-2.0 license

//! Raw records produced by the descriptor parser.
//!
//! These mirror the SVD document closely and have not been deduplicated,
//! bounds-checked, or overlap-checked yet. Names are kept exactly as written
//! (after text normalization); identifier sanitization happens at emission.

use std::fmt;

/// Hardware access policy of a register or bit field.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    #[default]
    ReadWrite,
    WriteOnce,
    ReadWriteOnce,
}

impl Access {
    /// Recognize an access qualifier.
    ///
    /// Matching is case-insensitive and accepts both the hyphenated spelling
    /// (`read-write-once`) and the SVD camel-case one (`read-writeOnce`).
    pub fn parse(text: &str) -> Option<Access> {
        let folded: String = text
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "readonly" => Some(Access::ReadOnly),
            "writeonly" => Some(Access::WriteOnly),
            "readwrite" => Some(Access::ReadWrite),
            "writeonce" => Some(Access::WriteOnce),
            "readwriteonce" => Some(Access::ReadWriteOnce),
            _ => None,
        }
    }

    /// Canonical hyphenated spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::ReadOnly => "read-only",
            Access::WriteOnly => "write-only",
            Access::ReadWrite => "read-write",
            Access::WriteOnce => "write-once",
            Access::ReadWriteOnce => "read-write-once",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bit field as declared in the descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawField {
    pub name: String,
    pub description: String,
    pub bit_offset: u32,
    /// Always non-zero.
    pub bit_width: u32,
    pub access: Access,
}

/// A register as declared in the descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawRegister {
    pub name: String,
    pub description: String,
    /// Byte offset from the peripheral base.
    pub address_offset: u64,
    /// Declared width in bits, within `(0, 1024]`.
    pub size_bits: u32,
    pub access: Access,
    /// Not yet checked against the register width.
    pub reset_value: u64,
    /// Fields in declaration order.
    pub fields: Vec<RawField>,
}

/// A peripheral as declared in the descriptor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawPeripheral {
    pub name: String,
    pub description: String,
    pub base_address: u64,
    /// Registers in declaration order.
    pub registers: Vec<RawRegister>,
}
