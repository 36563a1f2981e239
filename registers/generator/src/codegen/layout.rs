// Licensed under the Apache-2.0 license

//! Padding and packing for byte-exact layouts.
//!
//! Both walks keep a cursor starting at zero. Bits (for a register's
//! structured view) or bytes (for a peripheral aggregate) between the cursor
//! and the next member become an anonymous filler, so that the members always
//! add up to the full size.

use crate::types::{BitField, BitSpan, LayoutMember, PeripheralLayout, Register};
use log::debug;
use svd2cpp_parser::{Diagnostics, Warning};

/// Members of a register's structured view.
///
/// `fields` must be sorted by offset, disjoint, and inside `size_bits`. The
/// returned spans cover `0..size_bits` exactly. A register with no fields has
/// no structured view and gets no spans.
pub fn pack_register(fields: &[BitField], size_bits: u32) -> Vec<BitSpan> {
    if fields.is_empty() {
        return Vec::new();
    }
    let mut spans = Vec::with_capacity(fields.len() * 2 + 1);
    let mut cursor = 0;
    for (index, field) in fields.iter().enumerate() {
        if field.bit_offset > cursor {
            spans.push(BitSpan {
                offset: cursor,
                width: field.bit_offset - cursor,
                field: None,
            });
        }
        spans.push(BitSpan {
            offset: field.bit_offset,
            width: field.bit_width,
            field: Some(index),
        });
        cursor = field.bit_offset + field.bit_width;
    }
    if cursor < size_bits {
        spans.push(BitSpan {
            offset: cursor,
            width: size_bits - cursor,
            field: None,
        });
    }
    spans
}

/// Members of a peripheral aggregate.
///
/// `registers` must be sorted by address offset. A gap before a register
/// becomes a reserved member. A register that starts before the declared end
/// of an earlier one is reported and then placed at the cursor, since the
/// aggregate cannot place members on top of each other. A register that would
/// end past the 64-bit address space is dropped.
///
/// Returns the registers that were placed, which the layout indexes into.
pub fn pack_peripheral(
    peripheral: &str,
    registers: Vec<Register>,
    diags: &mut Diagnostics,
) -> (Vec<Register>, PeripheralLayout) {
    let mut layout = PeripheralLayout::default();
    let mut placed: Vec<Register> = Vec::with_capacity(registers.len());
    let mut reserved = 0;
    let mut cursor: u64 = 0;
    // Name and declared end of the register reaching furthest so far.
    let mut furthest: Option<(String, u64)> = None;

    for register in registers {
        let path = format!("{peripheral}.{}", register.name);
        let offset = cursor.max(register.address_offset);
        let (Some(declared_end), Some(end)) = (
            register.end_offset(),
            offset.checked_add(register.size as u64),
        ) else {
            diags.push(
                path,
                Warning::RegisterOutOfAddressSpace {
                    register: register.name,
                    offset,
                    size: register.size,
                },
            );
            continue;
        };

        if let Some((previous, previous_end)) = &furthest {
            if register.address_offset < *previous_end {
                diags.push(
                    path,
                    Warning::RegisterOverlap {
                        register: register.name.clone(),
                        offset: register.address_offset,
                        previous: previous.clone(),
                        previous_end: *previous_end,
                    },
                );
            }
        }
        if offset > cursor {
            layout.members.push(LayoutMember::Reserved {
                index: reserved,
                offset: cursor,
                size: offset - cursor,
            });
            reserved += 1;
        }
        layout.members.push(LayoutMember::Register {
            index: placed.len(),
            offset,
        });
        cursor = end;

        if furthest.as_ref().map_or(true, |(_, e)| declared_end > *e) {
            furthest = Some((register.name.clone(), declared_end));
        }
        placed.push(register);
    }

    layout.size = cursor;
    debug!(
        "Packed {peripheral}: {} member(s), {} byte(s)",
        layout.members.len(),
        layout.size
    );
    (placed, layout)
}
