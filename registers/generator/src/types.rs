// Licensed under the Apache-2.0 license

//! Validated register model.
//!
//! These types are produced once by validation and are immutable afterwards.
//! Every invariant the emitter relies on holds by construction:
//!
//! ```text
//! Peripheral
//! ├── registers: Vec<Register>   # unique names, ascending address_offset, non-empty
//! │   └── bit_fields: Vec<BitField>
//! │         # unique names, ascending bit_offset, disjoint, inside size_bits
//! └── layout: PeripheralLayout   # reserved gaps + registers, back to back
//! ```

use crate::util::RawRepr;
use svd2cpp_parser::Access;

//=============================================================================
// Bit fields
//=============================================================================

/// A named sub-range of a register.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitField {
    pub name: String,
    pub description: String,
    pub bit_offset: u32,
    /// Always non-zero.
    pub bit_width: u32,
    pub access: Access,
}

impl BitField {
    /// Index of the highest bit covered by the field.
    pub fn end_bit(&self) -> u32 {
        self.bit_offset + self.bit_width - 1
    }

    /// The field's bits within the register value, or `None` for fields that
    /// lie (partly) above bit 63.
    pub fn bit_mask(&self) -> Option<u64> {
        if self.end_bit() >= 64 {
            return None;
        }
        let ones = if self.bit_width == 64 {
            u64::MAX
        } else {
            (1u64 << self.bit_width) - 1
        };
        Some(ones << self.bit_offset)
    }

    /// Whether the two fields share at least one bit.
    pub fn overlaps(&self, other: &BitField) -> bool {
        !(self.end_bit() < other.bit_offset || self.bit_offset > other.end_bit())
    }
}

//=============================================================================
// Registers
//=============================================================================

/// One member of a register's structured view, in bit order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitSpan {
    pub offset: u32,
    pub width: u32,
    /// Index into [`Register::bit_fields`], or `None` for padding.
    pub field: Option<usize>,
}

impl BitSpan {
    pub fn is_padding(&self) -> bool {
        self.field.is_none()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Register {
    pub name: String,
    pub description: String,
    /// Byte offset from the peripheral base.
    pub address_offset: u64,
    /// Size in bytes, at least 1.
    pub size: u32,
    pub access: Access,
    /// Always fits in `size_bits()`.
    pub reset_value: u64,
    pub bit_fields: Vec<BitField>,
    /// Fields and padding covering exactly `size_bits()`. Empty when the
    /// register has no fields.
    pub packing: Vec<BitSpan>,
}

impl Register {
    pub fn size_bits(&self) -> u32 {
        self.size * 8
    }

    /// Largest value representable in the register, saturating at `u64::MAX`.
    pub fn max_value(&self) -> u64 {
        max_value(self.size_bits())
    }

    pub fn repr(&self) -> RawRepr {
        RawRepr::for_size(self.size)
    }

    /// Whether a bit-field view is emitted for this register.
    pub fn has_bit_view(&self) -> bool {
        !self.bit_fields.is_empty() && matches!(self.repr(), RawRepr::Int(_))
    }

    /// First byte offset past the register as declared, or `None` if that
    /// lies beyond the 64-bit address space.
    pub fn end_offset(&self) -> Option<u64> {
        self.address_offset.checked_add(self.size as u64)
    }
}

/// `(1 << bits) - 1`, saturating for 64 bits and up.
pub fn max_value(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

//=============================================================================
// Peripherals
//=============================================================================

/// One member of a peripheral aggregate, in address order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayoutMember {
    /// Unnamed filler bytes. `index` numbers the reserved members from 0.
    Reserved { index: usize, offset: u64, size: u64 },
    /// Index into [`Peripheral::registers`], placed at `offset`.
    Register { index: usize, offset: u64 },
}

impl LayoutMember {
    pub fn offset(&self) -> u64 {
        match self {
            LayoutMember::Reserved { offset, .. } | LayoutMember::Register { offset, .. } => *offset,
        }
    }
}

/// The byte layout of a peripheral aggregate.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PeripheralLayout {
    pub members: Vec<LayoutMember>,
    /// Sum of all member sizes.
    pub size: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Peripheral {
    pub name: String,
    pub description: String,
    pub base_address: u64,
    pub registers: Vec<Register>,
    pub layout: PeripheralLayout,
}
