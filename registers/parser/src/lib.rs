// Licensed under the Apache-2.0 license

//! CMSIS-SVD descriptor parser.
//!
//! This crate walks an SVD (System View Description) XML document and extracts
//! raw peripheral, register, and bit-field records. It is deliberately tolerant:
//! the SVD dialects found in the wild disagree on tag names and bit-range
//! encodings, so every entity is decoded by trying the known spellings in
//! priority order.
//!
//! Parsing an individual entity never fails outward. An entity that cannot be
//! decoded is dropped and a [`Diagnostic`] describing why is returned next to
//! the records that did decode. Only problems with the document as a whole
//! (missing file, malformed XML) are reported as [`SvdError`].
//!
//! ## Usage
//!
//! ```
//! let descriptor = svd2cpp_parser::parse(
//!     r#"<device><peripherals><peripheral>
//!          <name>GPIO</name>
//!          <baseAddress>0x40020000</baseAddress>
//!          <registers><register>
//!            <name>ODR</name>
//!            <addressOffset>0x14</addressOffset>
//!          </register></registers>
//!        </peripheral></peripherals></device>"#,
//! )
//! .unwrap();
//! assert_eq!(descriptor.peripherals[0].base_address, 0x4002_0000);
//! assert_eq!(descriptor.peripherals[0].registers[0].size_bits, 32);
//! ```
//!
//! ## Module Organization
//!
//! - [`ast`]: Raw (not yet validated) records produced by the parser
//! - [`bit_range`]: The three supported bit-range encodings
//! - [`diagnostics`]: Recoverable warnings collected during parsing
//! - [`literal`]: Integer literal parsing (hex, binary, octal, decimal)
//! - [`text`]: Entity decoding and whitespace normalization

pub mod ast;
pub mod bit_range;
pub mod diagnostics;
pub mod literal;
pub mod text;

mod decode;
mod error;

use log::debug;
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;
use xmltree::{Element, XMLNode};

pub use ast::{Access, RawField, RawPeripheral, RawRegister};
pub use bit_range::{BitRange, BitRangeEncoding, BitRangeError};
pub use decode::{Decode, Decoded};
pub use diagnostics::{Diagnostic, Diagnostics, EntityKind, Warning};
pub use error::{Result, SvdError};

/// Everything the parser recovered from one descriptor.
#[derive(Clone, Debug, Default)]
pub struct Descriptor {
    /// Candidate peripherals in document order.
    pub peripherals: Vec<RawPeripheral>,
    /// Warnings for every entity that was dropped or defaulted.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse an SVD document held in memory.
pub fn parse(xml: &str) -> Result<Descriptor> {
    parse_reader(xml.as_bytes())
}

/// Parse an SVD document from any reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Descriptor> {
    let root = Element::parse(reader)?;

    let mut elements = Vec::new();
    collect_peripheral_elements(&root, &mut elements);
    debug!("Found {} peripheral element(s)", elements.len());

    let mut descriptor = Descriptor::default();
    for (index, element) in elements.into_iter().enumerate() {
        let scope = format!("peripheral[{index}]");
        let decoded = RawPeripheral::decode(element, &scope);
        descriptor.diagnostics.extend(decoded.diagnostics);
        if let Some(peripheral) = decoded.value {
            descriptor.peripherals.push(peripheral);
        }
    }
    Ok(descriptor)
}

/// Read and parse an SVD file.
pub fn parse_file(path: &Path) -> Result<Descriptor> {
    let bytes = read_descriptor(path)?;
    parse_reader(bytes.as_slice())
}

/// Read the raw bytes of a descriptor file.
///
/// Distinguishes a missing path, a path that is not a regular file, and a
/// file that exists but cannot be read.
pub fn read_descriptor(path: &Path) -> Result<Vec<u8>> {
    let metadata = fs::metadata(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => SvdError::NotFound(path.to_path_buf()),
        _ => SvdError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    if !metadata.is_file() {
        return Err(SvdError::NotAFile(path.to_path_buf()));
    }
    fs::read(path).map_err(|source| SvdError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect every `<peripheral>` element in document (pre-)order, including
/// peripherals nested inside other elements or other peripherals.
fn collect_peripheral_elements<'a>(element: &'a Element, out: &mut Vec<&'a Element>) {
    if element.name == "peripheral" {
        out.push(element);
    }
    for child in element.children.iter() {
        if let XMLNode::Element(child) = child {
            collect_peripheral_elements(child, out);
        }
    }
}
