// Licensed under the Apache-2.0 license

//! SVD to C++ register header generator.
//!
//! This crate validates the raw records produced by `svd2cpp-parser` into an
//! immutable register model and emits one C++ header per peripheral. Each
//! register becomes a union of a raw integer and a bit-field struct; each
//! peripheral becomes a struct of registers and reserved padding at their
//! exact byte offsets, with compile-time size checks throughout.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use svd2cpp_generator::{generate_cpp_headers_from_file, FilterConfig, GeneratorConfig};
//!
//! let config = GeneratorConfig::default()
//!     .with_filter(FilterConfig::new().exclude_name("DBGMCU"));
//! let generation = generate_cpp_headers_from_file(Path::new("stm32f4.svd"), &config).unwrap();
//!
//! for diagnostic in &generation.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! for header in &generation.headers {
//!     std::fs::write(&header.file_name, &header.contents).unwrap();
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`util`]: Identifier sanitization, integer type ladder, literal formatting
//! - [`config`]: Reserved words and peripheral filtering ([`GeneratorConfig`])
//! - [`types`]: The validated model
//! - [`output`]: Generated output types and C++ emission
//! - [`codegen`]: Validation, layout packing, and the public pipeline API

pub mod codegen;
pub mod config;
pub mod output;
pub mod types;
pub mod util;

// Re-export main public API
pub use codegen::{
    generate_cpp_headers, generate_cpp_headers_from_file, generate_from_descriptor,
    validate_descriptor, Generation,
};
pub use config::{FilterConfig, GeneratorConfig, ReservedWords};
pub use output::{generate_header, GeneratedHeader};
pub use types::{BitField, BitSpan, LayoutMember, Peripheral, PeripheralLayout, Register};
