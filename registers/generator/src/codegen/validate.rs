// Licensed under the Apache-2.0 license

//! Validation of raw parser output into the immutable model.
//!
//! Rules, per scope:
//! - document: duplicate peripheral names are dropped (first wins), excluded
//!   peripherals are filtered, then each peripheral is validated; one left
//!   without registers is dropped, as is one whose header names clash with an
//!   earlier peripheral's
//! - peripheral: duplicate register names are dropped, registers are sorted by
//!   address offset, any whose member or type name clashes with a lower one
//!   is dropped, and the rest are packed
//! - register: duplicate field names are dropped, fields outside the register
//!   are dropped, the rest are sorted by bit offset and any field overlapping
//!   an already accepted one is dropped, as is one whose member name clashes
//!
//! Duplicate names are compared before sanitization, clashes after.

use std::collections::{HashMap, HashSet};

use log::debug;
use svd2cpp_parser::{Diagnostics, EntityKind, RawField, RawPeripheral, RawRegister, Warning};

use super::layout::{pack_peripheral, pack_register};
use crate::config::{GeneratorConfig, ReservedWords};
use crate::output::{register_type_name, HeaderNames};
use crate::types::{max_value, BitField, Peripheral, Register};
use crate::util::sanitize_identifier;

/// Validate every candidate peripheral, in document order.
pub fn validate_peripherals(
    peripherals: Vec<RawPeripheral>,
    config: &GeneratorConfig,
    diags: &mut Diagnostics,
) -> Vec<Peripheral> {
    let reserved = &config.reserved_words;
    let peripherals = dedup_by_name(
        peripherals,
        EntityKind::Peripheral,
        diags,
        |p| p.name.as_str(),
        |p| p.name.clone(),
    );

    let mut validated = Vec::with_capacity(peripherals.len());
    for raw in peripherals {
        if !config.filter.should_include(&raw.name) {
            debug!("Excluding peripheral {}", raw.name);
            continue;
        }
        if let Some(peripheral) = validate_peripheral(raw, reserved, diags) {
            validated.push(peripheral);
        }
    }
    let validated = drop_identifier_clashes(
        validated,
        EntityKind::Peripheral,
        diags,
        |p| p.name.as_str(),
        |p| HeaderNames::new(&p.name, reserved).global_identifiers(),
        |p| p.name.clone(),
    );
    if validated.is_empty() {
        diags.push(String::new(), Warning::NoPeripherals);
    }
    validated
}

/// Validate one peripheral. Returns `None` if no register survives.
pub fn validate_peripheral(
    raw: RawPeripheral,
    reserved: &ReservedWords,
    diags: &mut Diagnostics,
) -> Option<Peripheral> {
    let path = raw.name.clone();
    let registers = dedup_by_name(
        raw.registers,
        EntityKind::Register,
        diags,
        |r| r.name.as_str(),
        |r| format!("{path}.{}", r.name),
    );

    let mut registers: Vec<Register> = registers
        .into_iter()
        .map(|r| validate_register(r, &path, reserved, diags))
        .collect();
    registers.sort_by_key(|r| r.address_offset);
    let registers = drop_identifier_clashes(
        registers,
        EntityKind::Register,
        diags,
        |r| r.name.as_str(),
        |r| {
            vec![
                sanitize_identifier(&r.name, reserved),
                register_type_name(&r.name, reserved),
            ]
        },
        |r| format!("{path}.{}", r.name),
    );

    let (registers, layout) = pack_peripheral(&path, registers, diags);
    if registers.is_empty() {
        diags.push(&path, Warning::EmptyPeripheral);
        return None;
    }
    debug!(
        "Validated peripheral {path}: {} register(s), {} byte(s)",
        registers.len(),
        layout.size
    );
    Some(Peripheral {
        name: raw.name,
        description: raw.description,
        base_address: raw.base_address,
        registers,
        layout,
    })
}

/// Validate one register of the peripheral at `parent`.
pub fn validate_register(
    raw: RawRegister,
    parent: &str,
    reserved: &ReservedWords,
    diags: &mut Diagnostics,
) -> Register {
    let path = format!("{parent}.{}", raw.name);
    let size = raw.size_bits.div_ceil(8).max(1);
    let size_bits = size * 8;

    let max = max_value(size_bits);
    let reset_value = if raw.reset_value > max {
        let truncated = raw.reset_value & max;
        diags.push(
            &path,
            Warning::ResetValueTruncated {
                value: raw.reset_value,
                size_bits,
                truncated,
            },
        );
        truncated
    } else {
        raw.reset_value
    };

    let bit_fields = validate_fields(raw.fields, size_bits, &path, reserved, diags);
    let packing = pack_register(&bit_fields, size_bits);
    Register {
        name: raw.name,
        description: raw.description,
        address_offset: raw.address_offset,
        size,
        access: raw.access,
        reset_value,
        bit_fields,
        packing,
    }
}

/// Dedup, bounds-check, sort, and overlap-check the fields of one register.
pub fn validate_fields(
    fields: Vec<RawField>,
    size_bits: u32,
    path: &str,
    reserved: &ReservedWords,
    diags: &mut Diagnostics,
) -> Vec<BitField> {
    let fields = dedup_by_name(
        fields,
        EntityKind::Field,
        diags,
        |f| f.name.as_str(),
        |f| format!("{path}.{}", f.name),
    );

    let mut candidates: Vec<BitField> = fields
        .into_iter()
        .filter_map(|f| {
            let first = f.bit_offset as u64;
            let last = first + f.bit_width as u64 - 1;
            if last >= size_bits as u64 {
                diags.push(
                    format!("{path}.{}", f.name),
                    Warning::FieldOutOfBounds {
                        field: f.name,
                        first,
                        last,
                        size_bits,
                    },
                );
                return None;
            }
            Some(BitField {
                name: f.name,
                description: f.description,
                bit_offset: f.bit_offset,
                bit_width: f.bit_width,
                access: f.access,
            })
        })
        .collect();
    // Stable, so equal offsets keep declaration order.
    candidates.sort_by_key(|f| f.bit_offset);

    let mut accepted: Vec<BitField> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(other) = accepted.iter().find(|a| a.overlaps(&candidate)) {
            diags.push(
                format!("{path}.{}", candidate.name),
                Warning::FieldOverlap {
                    field: candidate.name.clone(),
                    other: other.name.clone(),
                },
            );
            continue;
        }
        accepted.push(candidate);
    }
    drop_identifier_clashes(
        accepted,
        EntityKind::Field,
        diags,
        |f| f.name.as_str(),
        |f| vec![sanitize_identifier(&f.name, reserved)],
        |f| format!("{path}.{}", f.name),
    )
}

/// Keep the first item of each name; warn about the rest.
fn dedup_by_name<T>(
    items: Vec<T>,
    kind: EntityKind,
    diags: &mut Diagnostics,
    name: impl Fn(&T) -> &str,
    path: impl Fn(&T) -> String,
) -> Vec<T> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(name(&item).to_string()) {
            kept.push(item);
        } else {
            diags.push(
                path(&item),
                Warning::Duplicate {
                    kind,
                    name: name(&item).to_string(),
                },
            );
        }
    }
    kept
}

/// Keep each item whose generated identifiers are all still free; warn about
/// the rest. Distinct names can sanitize to the same identifier.
fn drop_identifier_clashes<T>(
    items: Vec<T>,
    kind: EntityKind,
    diags: &mut Diagnostics,
    name: impl Fn(&T) -> &str,
    identifiers: impl Fn(&T) -> Vec<String>,
    path: impl Fn(&T) -> String,
) -> Vec<T> {
    let mut owners: HashMap<String, String> = HashMap::new();
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        let claimed = identifiers(&item);
        let clash = claimed
            .iter()
            .find_map(|identifier| owners.get(identifier).map(|other| (identifier, other)));
        if let Some((identifier, other)) = clash {
            diags.push(
                path(&item),
                Warning::IdentifierCollision {
                    kind,
                    name: name(&item).to_string(),
                    other: other.clone(),
                    identifier: identifier.clone(),
                },
            );
            continue;
        }
        for identifier in claimed {
            owners.insert(identifier, name(&item).to_string());
        }
        kept.push(item);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use svd2cpp_parser::Access;

    fn cpp() -> ReservedWords {
        ReservedWords::cpp()
    }

    fn raw_field(name: &str, bit_offset: u32, bit_width: u32) -> RawField {
        RawField {
            name: name.into(),
            description: String::new(),
            bit_offset,
            bit_width,
            access: Access::ReadWrite,
        }
    }

    fn raw_register(name: &str, address_offset: u64, fields: Vec<RawField>) -> RawRegister {
        RawRegister {
            name: name.into(),
            description: String::new(),
            address_offset,
            size_bits: 32,
            access: Access::ReadWrite,
            reset_value: 0,
            fields,
        }
    }

    fn raw_peripheral(name: &str, registers: Vec<RawRegister>) -> RawPeripheral {
        RawPeripheral {
            name: name.into(),
            description: String::new(),
            base_address: 0x4000_0000,
            registers,
        }
    }

    fn names(fields: &[BitField]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_overlap_first_declared_wins() {
        let mut diags = Diagnostics::new();
        let fields = validate_fields(
            vec![raw_field("A", 0, 4), raw_field("B", 2, 4)],
            32,
            "P.R",
            &cpp(),
            &mut diags,
        );
        assert_eq!(names(&fields), ["A"]);
        let diags = diags.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "P.R.B");
        assert_eq!(
            diags[0].warning,
            Warning::FieldOverlap {
                field: "B".into(),
                other: "A".into()
            }
        );
        let message = diags[0].to_string();
        assert!(message.contains("'A'") && message.contains("'B'"));
    }

    #[test]
    fn test_fields_sorted_by_offset() {
        let mut diags = Diagnostics::new();
        let fields = validate_fields(
            vec![raw_field("HI", 16, 8), raw_field("LO", 0, 8), raw_field("MID", 8, 8)],
            32,
            "P.R",
            &cpp(),
            &mut diags,
        );
        assert_eq!(names(&fields), ["LO", "MID", "HI"]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_equal_offsets_keep_declaration_order() {
        let mut diags = Diagnostics::new();
        let fields = validate_fields(
            vec![raw_field("FIRST", 4, 2), raw_field("SECOND", 4, 1)],
            32,
            "P.R",
            &cpp(),
            &mut diags,
        );
        assert_eq!(names(&fields), ["FIRST"]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_out_of_bounds_dropped_before_overlap() {
        let mut diags = Diagnostics::new();
        let fields = validate_fields(
            vec![raw_field("WIDE", 4, 8), raw_field("OK", 4, 4)],
            8,
            "P.R",
            &cpp(),
            &mut diags,
        );
        assert_eq!(names(&fields), ["OK"]);
        let diags = diags.into_vec();
        assert_eq!(
            diags[0].warning,
            Warning::FieldOutOfBounds {
                field: "WIDE".into(),
                first: 4,
                last: 11,
                size_bits: 8
            }
        );
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_out_of_bounds_does_not_overflow() {
        let mut diags = Diagnostics::new();
        let fields = validate_fields(
            vec![raw_field("X", u32::MAX, u32::MAX)],
            32,
            "P.R",
            &cpp(),
            &mut diags,
        );
        assert!(fields.is_empty());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_duplicate_fields() {
        let mut diags = Diagnostics::new();
        let fields = validate_fields(
            vec![raw_field("EN", 0, 1), raw_field("EN", 8, 1)],
            32,
            "P.R",
            &cpp(),
            &mut diags,
        );
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].bit_offset, 0);
        assert_eq!(
            diags.into_vec()[0].warning,
            Warning::Duplicate {
                kind: EntityKind::Field,
                name: "EN".into()
            }
        );
    }

    #[test]
    fn test_reset_value_truncated() {
        let mut raw = raw_register("R", 0, Vec::new());
        raw.size_bits = 8;
        raw.reset_value = 0x1FF;
        let mut diags = Diagnostics::new();
        let register = validate_register(raw, "P", &cpp(), &mut diags);
        assert_eq!(register.size, 1);
        assert_eq!(register.reset_value, 0xFF);
        assert_eq!(
            diags.into_vec()[0].warning,
            Warning::ResetValueTruncated {
                value: 0x1FF,
                size_bits: 8,
                truncated: 0xFF
            }
        );
    }

    #[test]
    fn test_register_size_rounds_up_to_bytes() {
        let mut raw = raw_register("R", 0, vec![raw_field("F", 8, 4)]);
        raw.size_bits = 12;
        let mut diags = Diagnostics::new();
        let register = validate_register(raw, "P", &cpp(), &mut diags);
        assert_eq!(register.size, 2);
        assert_eq!(register.size_bits(), 16);
        assert_eq!(register.bit_fields.len(), 1);
        assert_eq!(register.packing.iter().map(|s| s.width).sum::<u32>(), 16);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_wide_register_keeps_full_reset_value() {
        let mut raw = raw_register("R", 0, Vec::new());
        raw.size_bits = 128;
        raw.reset_value = u64::MAX;
        let mut diags = Diagnostics::new();
        let register = validate_register(raw, "P", &cpp(), &mut diags);
        assert_eq!(register.size, 16);
        assert_eq!(register.reset_value, u64::MAX);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_registers_sorted_and_deduplicated() {
        let mut diags = Diagnostics::new();
        let peripheral = validate_peripheral(
            raw_peripheral(
                "UART",
                vec![
                    raw_register("DR", 0x4, Vec::new()),
                    raw_register("SR", 0x0, Vec::new()),
                    raw_register("DR", 0x8, Vec::new()),
                ],
            ),
            &cpp(),
            &mut diags,
        )
        .unwrap();
        let names: Vec<_> = peripheral.registers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["SR", "DR"]);
        let diags = diags.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "UART.DR");
    }

    #[test]
    fn test_empty_peripheral_dropped() {
        let mut diags = Diagnostics::new();
        let peripherals = validate_peripherals(
            vec![
                raw_peripheral("EMPTY", Vec::new()),
                raw_peripheral("GPIO", vec![raw_register("IDR", 0x10, Vec::new())]),
            ],
            &GeneratorConfig::default(),
            &mut diags,
        );
        assert_eq!(peripherals.len(), 1);
        assert_eq!(peripherals[0].name, "GPIO");
        let diags = diags.into_vec();
        assert_eq!(diags[0].path, "EMPTY");
        assert_eq!(diags[0].warning, Warning::EmptyPeripheral);
    }

    #[test]
    fn test_duplicate_peripheral_dropped_even_if_first_is_empty() {
        let mut diags = Diagnostics::new();
        let peripherals = validate_peripherals(
            vec![
                raw_peripheral("GPIO", Vec::new()),
                raw_peripheral("GPIO", vec![raw_register("IDR", 0x10, Vec::new())]),
            ],
            &GeneratorConfig::default(),
            &mut diags,
        );
        assert!(peripherals.is_empty());
        let warnings: Vec<_> = diags.iter().map(|d| d.warning.clone()).collect();
        assert_eq!(
            warnings,
            [
                Warning::Duplicate {
                    kind: EntityKind::Peripheral,
                    name: "GPIO".into()
                },
                Warning::EmptyPeripheral,
                Warning::NoPeripherals,
            ]
        );
    }

    #[test]
    fn test_filter_excludes_peripherals() {
        let mut diags = Diagnostics::new();
        let peripherals = validate_peripherals(
            vec![
                raw_peripheral("GPIO", vec![raw_register("IDR", 0x10, Vec::new())]),
                raw_peripheral("UART", vec![raw_register("SR", 0x0, Vec::new())]),
            ],
            &GeneratorConfig::default().with_filter(FilterConfig::new().exclude_name("gpio")),
            &mut diags,
        );
        assert_eq!(peripherals.len(), 1);
        assert_eq!(peripherals[0].name, "UART");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_no_peripherals_is_a_warning() {
        let mut diags = Diagnostics::new();
        let peripherals = validate_peripherals(Vec::new(), &GeneratorConfig::default(), &mut diags);
        assert!(peripherals.is_empty());
        assert_eq!(diags.into_vec()[0].warning, Warning::NoPeripherals);
    }

    #[test]
    fn test_fields_sanitizing_to_one_member() {
        let mut diags = Diagnostics::new();
        let fields = validate_fields(
            vec![raw_field("EN.A", 0, 1), raw_field("EN_A", 1, 1), raw_field("EN B", 2, 1)],
            32,
            "P.R",
            &cpp(),
            &mut diags,
        );
        assert_eq!(names(&fields), ["EN.A", "EN B"]);
        let diags = diags.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "P.R.EN_A");
        assert_eq!(
            diags[0].warning,
            Warning::IdentifierCollision {
                kind: EntityKind::Field,
                name: "EN_A".into(),
                other: "EN.A".into(),
                identifier: "EN_A".into(),
            }
        );
    }

    #[test]
    fn test_field_clash_keeps_lower_offset() {
        let mut diags = Diagnostics::new();
        let fields = validate_fields(
            vec![raw_field("class", 8, 1), raw_field("class_", 0, 1)],
            32,
            "P.R",
            &cpp(),
            &mut diags,
        );
        assert_eq!(names(&fields), ["class_"]);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_registers_sanitizing_to_one_member() {
        let mut diags = Diagnostics::new();
        let peripheral = validate_peripheral(
            raw_peripheral(
                "SPI",
                vec![
                    raw_register("CR-1", 0x4, Vec::new()),
                    raw_register("CR_1", 0x0, Vec::new()),
                    raw_register("SR", 0x8, Vec::new()),
                ],
            ),
            &cpp(),
            &mut diags,
        )
        .unwrap();
        let names: Vec<_> = peripheral.registers.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["CR_1", "SR"]);
        assert_eq!(peripheral.layout.size, 0xC);
        let diags = diags.into_vec();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].path, "SPI.CR-1");
        assert_eq!(
            diags[0].warning,
            Warning::IdentifierCollision {
                kind: EntityKind::Register,
                name: "CR-1".into(),
                other: "CR_1".into(),
                identifier: "CR_1".into(),
            }
        );
    }

    #[test]
    fn test_register_member_clashing_with_type_name() {
        let mut diags = Diagnostics::new();
        let peripheral = validate_peripheral(
            raw_peripheral(
                "P",
                vec![raw_register("A", 0x0, Vec::new()), raw_register("A_t", 0x4, Vec::new())],
            ),
            &cpp(),
            &mut diags,
        )
        .unwrap();
        assert_eq!(peripheral.registers.len(), 1);
        assert!(matches!(
            &diags.into_vec()[0].warning,
            Warning::IdentifierCollision { identifier, .. } if identifier == "A_t"
        ));
    }

    #[test]
    fn test_peripherals_sharing_a_header() {
        let mut diags = Diagnostics::new();
        let peripherals = validate_peripherals(
            vec![
                raw_peripheral("GPIO", vec![raw_register("IDR", 0x10, Vec::new())]),
                raw_peripheral("gpio", vec![raw_register("ODR", 0x14, Vec::new())]),
                raw_peripheral("Gpio", vec![raw_register("ODR", 0x14, Vec::new())]),
            ],
            &GeneratorConfig::default(),
            &mut diags,
        );
        assert_eq!(peripherals.len(), 1);
        assert_eq!(peripherals[0].name, "GPIO");
        let diags = diags.into_vec();
        assert_eq!(diags.len(), 2);
        assert_eq!(diags[0].path, "gpio");
        assert_eq!(
            diags[0].warning,
            Warning::IdentifierCollision {
                kind: EntityKind::Peripheral,
                name: "gpio".into(),
                other: "GPIO".into(),
                identifier: "gpio_regs.hpp".into(),
            }
        );
        assert_eq!(diags[1].path, "Gpio");
    }

    #[test]
    fn test_register_past_address_space_is_dropped() {
        let mut diags = Diagnostics::new();
        let peripherals = validate_peripherals(
            vec![
                raw_peripheral("TOP", vec![raw_register("R", 0xFFFF_FFFF_FFFF_FFFE, Vec::new())]),
                raw_peripheral("GPIO", vec![raw_register("IDR", 0x10, Vec::new())]),
            ],
            &GeneratorConfig::default(),
            &mut diags,
        );
        assert_eq!(peripherals.len(), 1);
        assert_eq!(peripherals[0].name, "GPIO");
        let warnings: Vec<_> = diags.iter().map(|d| d.warning.clone()).collect();
        assert_eq!(
            warnings,
            [
                Warning::RegisterOutOfAddressSpace {
                    register: "R".into(),
                    offset: 0xFFFF_FFFF_FFFF_FFFE,
                    size: 4,
                },
                Warning::EmptyPeripheral,
            ]
        );
    }
}
