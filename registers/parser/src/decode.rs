// Licensed under the Apache-2.0 license

//! Per-entity decoders.
//!
//! Each entity kind implements [`Decode`]: given its XML element and the
//! dotted scope it lives in, produce the record (if it can be decoded at all)
//! plus every warning raised along the way. Decoding never fails outward.

use crate::ast::{Access, RawField, RawPeripheral, RawRegister};
use crate::bit_range::BitRangeEncoding;
use crate::diagnostics::{Diagnostic, Diagnostics, EntityKind, Warning};
use crate::literal::parse_u64;
use crate::text::element_text;
use log::debug;
use xmltree::{Element, XMLNode};

/// Tags tried for an entity's name, long form first.
const NAME_TAGS: &[&str] = &["name", "n"];

const DEFAULT_SIZE_BITS: u32 = 32;
const MAX_SIZE_BITS: u64 = 1024;

/// The outcome of decoding one entity.
#[derive(Clone, Debug)]
pub struct Decoded<T> {
    pub value: Option<T>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Decoded<T> {
    fn new(value: Option<T>, diagnostics: Diagnostics) -> Self {
        Self {
            value,
            diagnostics: diagnostics.into_vec(),
        }
    }
}

/// Decoding of one descriptor entity from its element.
pub trait Decode: Sized {
    const KIND: EntityKind;

    /// `scope` names the entity until its own name is known, e.g.
    /// `GPIO.register[3]`.
    fn decode(element: &Element, scope: &str) -> Decoded<Self>;
}

impl Decode for RawPeripheral {
    const KIND: EntityKind = EntityKind::Peripheral;

    fn decode(element: &Element, scope: &str) -> Decoded<Self> {
        let mut diags = Diagnostics::new();
        let Some(name) = entity_name::<Self>(element, scope, &mut diags) else {
            return Decoded::new(None, diags);
        };
        let path = name.clone();

        let Some(base_address) = required_u64(element, "baseAddress") else {
            diags.push(
                &path,
                Warning::MissingRequired {
                    kind: Self::KIND,
                    element: "baseAddress",
                },
            );
            return Decoded::new(None, diags);
        };

        let registers = children(element, "registers", "register")
            .enumerate()
            .filter_map(|(index, child)| {
                let decoded = RawRegister::decode(child, &format!("{path}.register[{index}]"));
                diags.extend(decoded.diagnostics);
                decoded.value
            })
            .collect::<Vec<_>>();

        debug!(
            "Parsed peripheral {path} at 0x{base_address:08X} ({} register(s))",
            registers.len()
        );
        Decoded::new(
            Some(RawPeripheral {
                name,
                description: description(element),
                base_address,
                registers,
            }),
            diags,
        )
    }
}

impl Decode for RawRegister {
    const KIND: EntityKind = EntityKind::Register;

    fn decode(element: &Element, scope: &str) -> Decoded<Self> {
        let mut diags = Diagnostics::new();
        let Some(name) = entity_name::<Self>(element, scope, &mut diags) else {
            return Decoded::new(None, diags);
        };
        let path = format!("{}.{name}", parent_scope(scope));

        let Some(address_offset) = required_u64(element, "addressOffset") else {
            diags.push(
                &path,
                Warning::MissingRequired {
                    kind: Self::KIND,
                    element: "addressOffset",
                },
            );
            return Decoded::new(None, diags);
        };

        let declared = optional_u64(element, "size", DEFAULT_SIZE_BITS as u64, &path, &mut diags);
        let size_bits = if declared == 0 || declared > MAX_SIZE_BITS {
            diags.push(
                &path,
                Warning::RegisterSizeOutOfRange { bits: declared },
            );
            DEFAULT_SIZE_BITS
        } else {
            declared as u32
        };

        let access = access(element, &path, &mut diags);
        let reset_value = optional_u64(element, "resetValue", 0, &path, &mut diags);

        let fields = children(element, "fields", "field")
            .enumerate()
            .filter_map(|(index, child)| {
                let decoded = RawField::decode(child, &format!("{path}.field[{index}]"));
                diags.extend(decoded.diagnostics);
                decoded.value
            })
            .collect::<Vec<_>>();

        debug!(
            "Parsed register {path} @ 0x{address_offset:04X}, {size_bits} bits ({} field(s))",
            fields.len()
        );
        Decoded::new(
            Some(RawRegister {
                name,
                description: description(element),
                address_offset,
                size_bits,
                access,
                reset_value,
                fields,
            }),
            diags,
        )
    }
}

impl Decode for RawField {
    const KIND: EntityKind = EntityKind::Field;

    fn decode(element: &Element, scope: &str) -> Decoded<Self> {
        let mut diags = Diagnostics::new();
        let Some(name) = entity_name::<Self>(element, scope, &mut diags) else {
            return Decoded::new(None, diags);
        };
        let path = format!("{}.{name}", parent_scope(scope));

        let encodings = BitRangeEncoding::detect(element);
        let (range, rejected) = BitRangeEncoding::resolve_first(&encodings);
        for err in rejected {
            diags.push(&path, Warning::RejectedBitRange(err));
        }
        let Some(range) = range else {
            diags.push(&path, Warning::UnresolvedBitRange);
            return Decoded::new(None, diags);
        };

        let access = access(element, &path, &mut diags);
        Decoded::new(
            Some(RawField {
                name,
                description: description(element),
                bit_offset: range.offset,
                bit_width: range.width,
                access,
            }),
            diags,
        )
    }
}

/// The first present name tag wins, even if its text turns out empty.
fn entity_name<T: Decode>(element: &Element, scope: &str, diags: &mut Diagnostics) -> Option<String> {
    let name = NAME_TAGS
        .iter()
        .find_map(|tag| element.get_child(*tag))
        .map(element_text)
        .filter(|name| !name.is_empty());
    if name.is_none() {
        diags.push(scope, Warning::MissingName(T::KIND));
    }
    name
}

/// `GPIO.register[3]` -> `GPIO`.
fn parent_scope(scope: &str) -> &str {
    scope.rsplit_once('.').map_or("", |(parent, _)| parent)
}

fn description(element: &Element) -> String {
    element
        .get_child("description")
        .map(element_text)
        .unwrap_or_default()
}

/// A value that must be present and parse; there is no sensible default.
fn required_u64(element: &Element, tag: &str) -> Option<u64> {
    element
        .get_child(tag)
        .and_then(|child| parse_u64(&element_text(child)))
}

/// A value with a default. Present-but-unparseable text warns and falls back.
fn optional_u64(
    element: &Element,
    tag: &'static str,
    default: u64,
    path: &str,
    diags: &mut Diagnostics,
) -> u64 {
    let Some(child) = element.get_child(tag) else {
        return default;
    };
    let text = element_text(child);
    parse_u64(&text).unwrap_or_else(|| {
        diags.push(
            path,
            Warning::InvalidInteger {
                element: tag,
                text,
                default,
            },
        );
        default
    })
}

fn access(element: &Element, path: &str, diags: &mut Diagnostics) -> Access {
    let Some(child) = element.get_child("access") else {
        return Access::default();
    };
    let text = element_text(child);
    Access::parse(&text).unwrap_or_else(|| {
        diags.push(path, Warning::UnknownAccess(text));
        Access::default()
    })
}

/// Elements named `item` inside the first `group` child.
fn children<'a>(element: &'a Element, group: &str, item: &'a str) -> impl Iterator<Item = &'a Element> {
    element
        .get_child(group)
        .into_iter()
        .flat_map(|group| group.children.iter())
        .filter_map(move |node| match node {
            XMLNode::Element(child) if child.name == item => Some(child),
            _ => None,
        })
}
