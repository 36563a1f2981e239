// Licensed under the Apache-2.0 license

//! The parse, validate, and emit pipeline.
//!
//! The implementation is split across submodules:
//! - `validate`: Turning raw parser records into the validated model
//! - `layout`: Padding computation for registers and peripherals

mod layout;
mod validate;

use std::path::Path;

use anyhow::Context;
use log::{debug, info};
use svd2cpp_parser::{Descriptor, Diagnostic, Diagnostics};

use crate::config::GeneratorConfig;
use crate::output::{generate_header, GeneratedHeader};
use crate::types::Peripheral;

pub use layout::{pack_peripheral, pack_register};
pub use validate::{validate_fields, validate_peripheral, validate_peripherals, validate_register};

/// The result of one pipeline run.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    /// Validated peripherals, in document order.
    pub peripherals: Vec<Peripheral>,
    /// One header per entry in `peripherals`, in the same order.
    pub headers: Vec<GeneratedHeader>,
    /// Parser diagnostics followed by validation diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

/// Validate a parsed descriptor into the immutable model.
pub fn validate_descriptor(
    descriptor: Descriptor,
    config: &GeneratorConfig,
) -> (Vec<Peripheral>, Vec<Diagnostic>) {
    let mut diags = Diagnostics::new();
    diags.extend(descriptor.diagnostics);
    let peripherals = validate_peripherals(descriptor.peripherals, config, &mut diags);
    (peripherals, diags.into_vec())
}

/// Validate a parsed descriptor and emit one header per peripheral.
pub fn generate_from_descriptor(descriptor: Descriptor, config: &GeneratorConfig) -> Generation {
    let candidates = descriptor.peripherals.len();
    let (peripherals, diagnostics) = validate_descriptor(descriptor, config);
    info!(
        "Validated {} of {candidates} peripheral(s), {} diagnostic(s)",
        peripherals.len(),
        diagnostics.len()
    );

    let headers = peripherals
        .iter()
        .map(|peripheral| {
            let header = generate_header(peripheral, &config.reserved_words);
            debug!(
                "Generated {} for {} ({} byte(s))",
                header.file_name,
                peripheral.name,
                header.contents.len()
            );
            header
        })
        .collect();

    Generation {
        peripherals,
        headers,
        diagnostics,
    }
}

/// Generate C++ headers from SVD text held in memory.
pub fn generate_cpp_headers(xml: &str, config: &GeneratorConfig) -> anyhow::Result<Generation> {
    let descriptor = svd2cpp_parser::parse(xml)?;
    Ok(generate_from_descriptor(descriptor, config))
}

/// Generate C++ headers from an SVD file.
///
/// Fails only if the file cannot be read or is not well-formed XML. Every
/// other anomaly is reported in [`Generation::diagnostics`].
pub fn generate_cpp_headers_from_file(
    file: &Path,
    config: &GeneratorConfig,
) -> anyhow::Result<Generation> {
    let descriptor = svd2cpp_parser::parse_file(file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    Ok(generate_from_descriptor(descriptor, config))
}
