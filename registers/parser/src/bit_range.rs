// Licensed under the Apache-2.0 license

//! Bit-range encodings.
//!
//! SVD allows a field's position to be written three ways:
//!
//! ```text
//! <bitOffset>4</bitOffset><bitWidth>4</bitWidth>    OffsetWidth
//! <lsb>4</lsb><msb>7</msb>                          LsbMsb
//! <bitRange>[7:4]</bitRange>   or   [4]             RangeString
//! ```
//!
//! [`BitRangeEncoding::detect`] lists the encodings a field element carries,
//! in that priority order, and the first one that resolves wins.

use crate::literal::parse_u64;
use crate::text::element_text;
use thiserror::Error;
use winnow::ascii::{dec_uint, space0};
use winnow::combinator::{delimited, opt, preceded};
use winnow::prelude::*;
use winnow::ModalResult;
use xmltree::Element;

/// A resolved bit position: `width` bits starting at bit `offset`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BitRange {
    pub offset: u32,
    /// Always non-zero.
    pub width: u32,
}

impl BitRange {
    fn from_msb_lsb(msb: u32, lsb: u32) -> Result<BitRange, BitRangeError> {
        if msb < lsb {
            return Err(BitRangeError::Inverted { msb, lsb });
        }
        let width = (msb - lsb).checked_add(1).ok_or(BitRangeError::TooWide)?;
        Ok(BitRange { offset: lsb, width })
    }
}

/// Why an encoding present on a field did not resolve.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum BitRangeError {
    #[error("<{element}> value '{text}' is not a valid bit position")]
    InvalidNumber { element: &'static str, text: String },

    #[error("<bitWidth> must be greater than zero")]
    ZeroWidth,

    #[error("msb {msb} is below lsb {lsb}")]
    Inverted { msb: u32, lsb: u32 },

    #[error("'{0}' is not of the form [msb:lsb] or [bit]")]
    Malformed(String),

    #[error("bit range does not fit in 32-bit positions")]
    TooWide,
}

/// One way of writing a field's bit position, holding the raw element text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BitRangeEncoding {
    OffsetWidth { offset: String, width: String },
    LsbMsb { lsb: String, msb: String },
    RangeString(String),
}

impl BitRangeEncoding {
    /// The encodings present on `field`, highest priority first.
    pub fn detect(field: &Element) -> Vec<BitRangeEncoding> {
        let mut found = Vec::new();
        if let (Some(offset), Some(width)) = (field.get_child("bitOffset"), field.get_child("bitWidth")) {
            found.push(BitRangeEncoding::OffsetWidth {
                offset: element_text(offset),
                width: element_text(width),
            });
        }
        if let (Some(lsb), Some(msb)) = (field.get_child("lsb"), field.get_child("msb")) {
            found.push(BitRangeEncoding::LsbMsb {
                lsb: element_text(lsb),
                msb: element_text(msb),
            });
        }
        if let Some(range) = field.get_child("bitRange") {
            found.push(BitRangeEncoding::RangeString(element_text(range)));
        }
        found
    }

    pub fn resolve(&self) -> Result<BitRange, BitRangeError> {
        match self {
            BitRangeEncoding::OffsetWidth { offset, width } => {
                let offset = position("bitOffset", offset)?;
                let width = position("bitWidth", width)?;
                if width == 0 {
                    return Err(BitRangeError::ZeroWidth);
                }
                offset.checked_add(width).ok_or(BitRangeError::TooWide)?;
                Ok(BitRange { offset, width })
            }
            BitRangeEncoding::LsbMsb { lsb, msb } => {
                let lsb = position("lsb", lsb)?;
                let msb = position("msb", msb)?;
                BitRange::from_msb_lsb(msb, lsb)
            }
            BitRangeEncoding::RangeString(text) => match bracketed.parse(text.as_str()) {
                Ok((msb, Some(lsb))) => BitRange::from_msb_lsb(msb, lsb),
                Ok((bit, None)) => Ok(BitRange {
                    offset: bit,
                    width: 1,
                }),
                Err(_) => Err(BitRangeError::Malformed(text.clone())),
            },
        }
    }

    /// Resolve the first encoding that succeeds. Rejections of the encodings
    /// tried before it are returned alongside.
    pub fn resolve_first(encodings: &[BitRangeEncoding]) -> (Option<BitRange>, Vec<BitRangeError>) {
        let mut rejected = Vec::new();
        for encoding in encodings {
            match encoding.resolve() {
                Ok(range) => return (Some(range), rejected),
                Err(err) => rejected.push(err),
            }
        }
        (None, rejected)
    }
}

fn position(element: &'static str, text: &str) -> Result<u32, BitRangeError> {
    parse_u64(text)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| BitRangeError::InvalidNumber {
            element,
            text: text.to_string(),
        })
}

/// `[msb:lsb]` or `[bit]`, whitespace allowed inside the brackets.
fn bracketed(input: &mut &str) -> ModalResult<(u32, Option<u32>)> {
    delimited(
        ('[', space0),
        (dec_uint, opt(preceded((space0, ':', space0), dec_uint))),
        (space0, ']'),
    )
    .parse_next(input)
}
