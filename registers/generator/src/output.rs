// Licensed under the Apache-2.0 license

//! Output types and C++ header emission.
//!
//! This module projects a validated [`Peripheral`] into a self-contained C++
//! header. No validation happens here: every layout decision was already made
//! and recorded in the model.
//!
//! ## Generated Code Structure
//!
//! For a peripheral named "GPIO", the generated `gpio_regs.hpp` looks like:
//!
//! ```text
//! #ifndef GPIO_REGS_HPP
//! #define GPIO_REGS_HPP
//!
//! #include <cstdint>
//!
//! namespace gpio_regs {
//!
//! union MODE_t {
//!     uint32_t raw;
//!     struct {
//!         uint32_t MODE0 : 2;
//!         uint32_t : 30;
//!     } bits;
//! };
//! static_assert(sizeof(MODE_t) == 4, "Size mismatch for MODE_t");
//!
//! struct GPIO_regs_t {
//!     volatile MODE_t MODE;        // 0x0000
//!     uint8_t _reserved_000[12];   // 0x0004
//!     volatile IDR_t IDR;          // 0x0010
//! };
//! static_assert(sizeof(GPIO_regs_t) >= 20, "Size mismatch for GPIO_regs_t");
//!
//! constexpr std::uintptr_t GPIO_BASE_ADDRESS = 0x40020000U;
//!
//! } // namespace gpio_regs
//!
//! #define GPIO_REGS (reinterpret_cast<volatile ::gpio_regs::GPIO_regs_t*>(::gpio_regs::GPIO_BASE_ADDRESS))
//!
//! #endif // GPIO_REGS_HPP
//! ```

use std::fmt;

use crate::config::ReservedWords;
use crate::types::{LayoutMember, Peripheral, Register};
use crate::util::{address_literal, comment_text, hex_literal, sanitize_identifier, RawRepr};

//=============================================================================
// Generated Types
//=============================================================================

/// One generated header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedHeader {
    /// Original (unsanitized) peripheral name.
    pub peripheral: String,
    /// File name relative to the output directory, e.g. `gpio_regs.hpp`.
    pub file_name: String,
    pub contents: String,
}

/// Identifiers derived from a peripheral name. All of them are sanitized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HeaderNames {
    pub file_name: String,
    pub namespace: String,
    pub struct_name: String,
    pub guard: String,
    pub base_constant: String,
    pub pointer_macro: String,
}

impl HeaderNames {
    pub fn new(peripheral: &str, reserved: &ReservedWords) -> Self {
        let lower = peripheral.to_lowercase();
        let upper = peripheral.to_uppercase();
        let sanitize = |name: String| sanitize_identifier(&name, reserved);
        Self {
            file_name: format!("{}.hpp", sanitize(format!("{lower}_regs"))),
            namespace: sanitize(format!("{lower}_regs")),
            struct_name: sanitize(format!("{upper}_regs_t")),
            guard: sanitize(format!("{upper}_REGS_HPP")),
            base_constant: sanitize(format!("{upper}_BASE_ADDRESS")),
            pointer_macro: sanitize(format!("{upper}_REGS")),
        }
    }

    /// Names that must be unique across all generated headers.
    pub fn global_identifiers(&self) -> Vec<String> {
        vec![
            self.file_name.clone(),
            self.guard.clone(),
            self.pointer_macro.clone(),
        ]
    }
}

/// Name of the union type generated for a register.
pub fn register_type_name(register: &str, reserved: &ReservedWords) -> String {
    sanitize_identifier(&format!("{register}_t"), reserved)
}

/// Produce the header for one validated peripheral.
pub fn generate_header(peripheral: &Peripheral, reserved: &ReservedWords) -> GeneratedHeader {
    let header = CppHeader::new(peripheral, reserved);
    GeneratedHeader {
        peripheral: peripheral.name.clone(),
        file_name: header.names.file_name.clone(),
        contents: header.to_string(),
    }
}

//=============================================================================
// Code Generation
//=============================================================================

/// Renders a peripheral as C++ through [`fmt::Display`].
pub struct CppHeader<'a> {
    peripheral: &'a Peripheral,
    reserved: &'a ReservedWords,
    names: HeaderNames,
}

impl<'a> CppHeader<'a> {
    pub fn new(peripheral: &'a Peripheral, reserved: &'a ReservedWords) -> Self {
        Self {
            peripheral,
            reserved,
            names: HeaderNames::new(&peripheral.name, reserved),
        }
    }

    fn ident(&self, name: &str) -> String {
        sanitize_identifier(name, self.reserved)
    }

    fn type_name(&self, register: &Register) -> String {
        register_type_name(&register.name, self.reserved)
    }

    fn write_preamble(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.peripheral;
        writeln!(f, "#ifndef {}", self.names.guard)?;
        writeln!(f, "#define {}", self.names.guard)?;
        writeln!(f)?;
        writeln!(f, "#include <cstdint>")?;
        writeln!(f)?;
        writeln!(f, "/**")?;
        writeln!(f, " * @file {}", self.names.file_name)?;
        writeln!(f, " * @brief {} register definitions", comment_text(&p.name))?;
        if !p.description.is_empty() {
            writeln!(f, " * @details {}", comment_text(&p.description))?;
        }
        writeln!(f, " *")?;
        writeln!(f, " * Generated from SVD file - DO NOT EDIT MANUALLY")?;
        writeln!(f, " *")?;
        writeln!(f, " * Base address: {}", hex_literal(p.base_address, 8))?;
        writeln!(f, " */")?;
        writeln!(f)?;
        writeln!(f, "namespace {} {{", self.names.namespace)?;
        writeln!(f)
    }

    fn write_register(&self, f: &mut fmt::Formatter<'_>, register: &Register) -> fmt::Result {
        let type_name = self.type_name(register);
        let reset_digits = if register.size <= 4 { 8 } else { 16 };

        writeln!(f, "/**")?;
        writeln!(f, " * @brief {} register", comment_text(&register.name))?;
        if !register.description.is_empty() {
            writeln!(f, " * @details {}", comment_text(&register.description))?;
        }
        writeln!(f, " *")?;
        writeln!(f, " * Offset: {}", hex_literal(register.address_offset, 4))?;
        writeln!(f, " * Size: {} bits", register.size_bits())?;
        writeln!(
            f,
            " * Reset value: {}",
            hex_literal(register.reset_value, reset_digits)
        )?;
        writeln!(f, " * Access: {}", register.access)?;
        writeln!(f, " */")?;

        writeln!(f, "union {type_name} {{")?;
        match register.repr() {
            RawRepr::Int(int) => {
                writeln!(f, "    {} raw;", int.cpp_name())?;
                if register.has_bit_view() {
                    writeln!(f, "    struct {{")?;
                    for span in &register.packing {
                        match span.field.map(|index| &register.bit_fields[index]) {
                            Some(field) => {
                                if !field.description.is_empty() {
                                    writeln!(f, "        /// {}", field.description)?;
                                }
                                writeln!(
                                    f,
                                    "        {} {} : {};",
                                    int.cpp_name(),
                                    self.ident(&field.name),
                                    span.width
                                )?;
                            }
                            None => writeln!(f, "        {} : {};", int.cpp_name(), span.width)?,
                        }
                    }
                    writeln!(f, "    }} bits;")?;
                }
            }
            RawRepr::Bytes(len) => writeln!(f, "    uint8_t raw[{len}];")?,
        }
        writeln!(f, "}};")?;
        writeln!(
            f,
            "static_assert(sizeof({type_name}) == {}, \"Size mismatch for {type_name}\");",
            register.size
        )?;
        writeln!(f)
    }

    fn write_aggregate(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.peripheral;
        let struct_name = &self.names.struct_name;

        writeln!(f, "/**")?;
        writeln!(f, " * @brief {} peripheral registers", comment_text(&p.name))?;
        writeln!(f, " */")?;
        writeln!(f, "struct {struct_name} {{")?;
        for member in &p.layout.members {
            let declaration = match member {
                LayoutMember::Reserved { index, size, .. } => {
                    format!("uint8_t _reserved_{index:03}[{size}];")
                }
                LayoutMember::Register { index, .. } => {
                    let register = &p.registers[*index];
                    format!(
                        "volatile {} {};",
                        self.type_name(register),
                        self.ident(&register.name)
                    )
                }
            };
            writeln!(
                f,
                "    {declaration:<40} // {}",
                hex_literal(member.offset(), 4)
            )?;
        }
        writeln!(f, "}};")?;
        writeln!(
            f,
            "static_assert(sizeof({struct_name}) >= {}, \"Size mismatch for {struct_name}\");",
            p.layout.size
        )?;
        writeln!(f)
    }

    fn write_postamble(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.peripheral;
        let names = &self.names;
        writeln!(f, "/// Base address of {}", p.name)?;
        writeln!(
            f,
            "constexpr std::uintptr_t {} = {};",
            names.base_constant,
            address_literal(p.base_address)
        )?;
        writeln!(f)?;
        writeln!(f, "}} // namespace {}", names.namespace)?;
        writeln!(f)?;
        writeln!(f, "/// Pointer to the {} register block", p.name)?;
        writeln!(
            f,
            "#define {} (reinterpret_cast<volatile ::{ns}::{}*>(::{ns}::{}))",
            names.pointer_macro,
            names.struct_name,
            names.base_constant,
            ns = names.namespace
        )?;
        writeln!(f)?;
        writeln!(f, "#endif // {}", names.guard)
    }
}

impl fmt::Display for CppHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_preamble(f)?;
        for register in &self.peripheral.registers {
            self.write_register(f, register)?;
        }
        self.write_aggregate(f)?;
        self.write_postamble(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BitField, BitSpan, PeripheralLayout};
    use svd2cpp_parser::Access;

    fn peripheral(name: &str, registers: Vec<Register>, layout: PeripheralLayout) -> Peripheral {
        Peripheral {
            name: name.into(),
            description: String::new(),
            base_address: 0x4001_1000,
            registers,
            layout,
        }
    }

    fn register(name: &str, size: u32) -> Register {
        Register {
            name: name.into(),
            description: String::new(),
            address_offset: 0,
            size,
            access: Access::ReadOnly,
            reset_value: 0,
            bit_fields: Vec::new(),
            packing: Vec::new(),
        }
    }

    fn single(name: &str, register: Register) -> Peripheral {
        let size = register.size as u64;
        peripheral(
            name,
            vec![register],
            PeripheralLayout {
                members: vec![LayoutMember::Register {
                    index: 0,
                    offset: 0,
                }],
                size,
            },
        )
    }

    #[test]
    fn test_header_names() {
        let names = HeaderNames::new("Uart-1", &ReservedWords::cpp());
        assert_eq!(names.file_name, "uart_1_regs.hpp");
        assert_eq!(names.namespace, "uart_1_regs");
        assert_eq!(names.struct_name, "UART_1_regs_t");
        assert_eq!(names.guard, "UART_1_REGS_HPP");
        assert_eq!(names.base_constant, "UART_1_BASE_ADDRESS");
        assert_eq!(names.pointer_macro, "UART_1_REGS");

        let names = HeaderNames::new("2nd", &ReservedWords::cpp());
        assert_eq!(names.namespace, "_2nd_regs");
        assert_eq!(names.struct_name, "_2ND_regs_t");
    }

    #[test]
    fn test_byte_array_register_has_no_bit_view() {
        let mut wide = register("KEY", 16);
        wide.bit_fields.push(BitField {
            name: "LOW".into(),
            description: String::new(),
            bit_offset: 0,
            bit_width: 8,
            access: Access::ReadOnly,
        });
        wide.packing = vec![BitSpan {
            offset: 0,
            width: 8,
            field: Some(0),
        }];
        let header = generate_header(&single("AES", wide), &ReservedWords::cpp());
        assert!(header.contents.contains("    uint8_t raw[16];\n"));
        assert!(!header.contents.contains("bits;"));
        assert!(header
            .contents
            .contains("static_assert(sizeof(KEY_t) == 16, \"Size mismatch for KEY_t\");"));
        assert!(header.contents.contains(" * Reset value: 0x0000000000000000\n"));
    }

    #[test]
    fn test_odd_sized_register_is_byte_array() {
        let header = generate_header(&single("P", register("R24", 3)), &ReservedWords::cpp());
        assert!(header.contents.contains("    uint8_t raw[3];\n"));
        assert!(header.contents.contains("sizeof(R24_t) == 3"));
    }

    #[test]
    fn test_comment_cannot_be_terminated_early() {
        let mut p = single("P", register("R", 4));
        p.description = "ends */ here".into();
        let header = generate_header(&p, &ReservedWords::cpp());
        assert!(header.contents.contains(" * @details ends * / here\n"));
    }

    #[test]
    fn test_reserved_member_names() {
        let p = single("P", register("delete", 4));
        let header = generate_header(&p, &ReservedWords::cpp());
        assert!(header.contents.contains("volatile delete_t delete_;"));
    }

    #[test]
    fn test_wide_base_address() {
        let mut p = single("P", register("R", 4));
        p.base_address = 0x1_0000_0000;
        let header = generate_header(&p, &ReservedWords::cpp());
        assert!(header
            .contents
            .contains("constexpr std::uintptr_t P_BASE_ADDRESS = 0x0000000100000000ULL;"));
    }
}
