// Licensed under the Apache-2.0 license

//! Recoverable anomalies found while parsing or validating a descriptor.
//!
//! Nothing in this crate prints. Each stage hands back a list of
//! [`Diagnostic`]s next to its result and the caller decides how to surface
//! them.

use crate::bit_range::BitRangeError;
use std::fmt;
use thiserror::Error;

/// The kind of descriptor entity a warning refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EntityKind {
    Peripheral,
    Register,
    Field,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Peripheral => "peripheral",
            EntityKind::Register => "register",
            EntityKind::Field => "bit field",
        })
    }
}

/// A recoverable problem. The offending entity was dropped, defaulted,
/// normalized, or truncated, and processing continued.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum Warning {
    #[error("{0} has no name, skipping")]
    MissingName(EntityKind),

    #[error("missing or unparseable <{element}>, skipping {kind}")]
    MissingRequired {
        kind: EntityKind,
        element: &'static str,
    },

    #[error("<{element}> value '{text}' is not a valid integer, using {default}")]
    InvalidInteger {
        element: &'static str,
        text: String,
        default: u64,
    },

    #[error("ignoring bit range: {0}")]
    RejectedBitRange(BitRangeError),

    #[error("no usable bit range (bitOffset/bitWidth, lsb/msb or bitRange), skipping")]
    UnresolvedBitRange,

    #[error("declared size of {bits} bits is outside (0, 1024], using 32")]
    RegisterSizeOutOfRange { bits: u64 },

    #[error("unrecognized access '{0}', using read-write")]
    UnknownAccess(String),

    #[error("duplicate {kind} name '{name}', keeping the first occurrence")]
    Duplicate { kind: EntityKind, name: String },

    #[error("bit field '{field}' (bits {first}..={last}) extends beyond the {size_bits}-bit register, skipping")]
    FieldOutOfBounds {
        field: String,
        first: u64,
        last: u64,
        size_bits: u32,
    },

    #[error("bit field '{field}' overlaps with '{other}', skipping")]
    FieldOverlap { field: String, other: String },

    #[error("reset value {value:#x} does not fit in {size_bits} bits, truncated to {truncated:#x}")]
    ResetValueTruncated {
        value: u64,
        size_bits: u32,
        truncated: u64,
    },

    #[error("register '{register}' at offset {offset:#x} overlaps '{previous}' (which ends at {previous_end:#x})")]
    RegisterOverlap {
        register: String,
        offset: u64,
        previous: String,
        previous_end: u64,
    },

    #[error("register '{register}' placed at offset {offset:#x} with {size} byte(s) does not fit in the 64-bit address space, skipping")]
    RegisterOutOfAddressSpace {
        register: String,
        offset: u64,
        size: u32,
    },

    #[error("{kind} '{name}' generates '{identifier}', already used by '{other}', skipping")]
    IdentifierCollision {
        kind: EntityKind,
        name: String,
        other: String,
        identifier: String,
    },

    #[error("no registers left after validation, skipping peripheral")]
    EmptyPeripheral,

    #[error("no valid peripherals found in SVD file")]
    NoPeripherals,
}

/// A [`Warning`] together with the dotted path of the entity it concerns,
/// e.g. `GPIO.MODE.MODE0`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub path: String,
    pub warning: Warning,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.warning)
        } else {
            write!(f, "{}: {}", self.path, self.warning)
        }
    }
}

/// Collector used while walking one scope.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>, warning: Warning) {
        self.entries.push(Diagnostic {
            path: path.into(),
            warning,
        });
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.entries.extend(diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic {
            path: "UART.CR1".into(),
            warning: Warning::FieldOverlap {
                field: "B".into(),
                other: "A".into(),
            },
        };
        assert_eq!(
            diagnostic.to_string(),
            "UART.CR1: bit field 'B' overlaps with 'A', skipping"
        );

        let diagnostic = Diagnostic {
            path: String::new(),
            warning: Warning::NoPeripherals,
        };
        assert_eq!(diagnostic.to_string(), "no valid peripherals found in SVD file");
    }

    #[test]
    fn test_truncation_message_uses_hex() {
        let warning = Warning::ResetValueTruncated {
            value: 0x1ff,
            size_bits: 8,
            truncated: 0xff,
        };
        assert_eq!(
            warning.to_string(),
            "reset value 0x1ff does not fit in 8 bits, truncated to 0xff"
        );
    }

    #[test]
    fn test_collision_message_names_both_entities() {
        let warning = Warning::IdentifierCollision {
            kind: EntityKind::Field,
            name: "EN_A".into(),
            other: "EN.A".into(),
            identifier: "EN_A".into(),
        };
        assert_eq!(
            warning.to_string(),
            "bit field 'EN_A' generates 'EN_A', already used by 'EN.A', skipping"
        );
    }
}
