// Licensed under the Apache-2.0 license

use anyhow::Context;
use log::{debug, error};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use svd2cpp_generator::GeneratedHeader;

/// Outcome of writing a batch of headers.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, io::Error)>,
}

/// Write every header into `output_dir`, creating it if needed.
///
/// Failing to create the directory is fatal. A header that cannot be written
/// is logged and skipped; the others are still written.
pub fn write_headers(output_dir: &Path, headers: &[GeneratedHeader]) -> anyhow::Result<WriteReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory {}", output_dir.display()))?;

    let mut report = WriteReport::default();
    for header in headers {
        let path = output_dir.join(&header.file_name);
        match write_if_changed(&path, &header.contents) {
            Ok(true) => debug!("Wrote {}", path.display()),
            Ok(false) => debug!("{} is up to date", path.display()),
            Err(err) => {
                error!("Error generating {}: {err}", path.display());
                report.failed.push((path, err));
                continue;
            }
        }
        report.written.push(path);
    }
    Ok(report)
}

/// Skip the write when the file already holds exactly `contents`, so that
/// re-running leaves timestamps alone. Returns whether the file was written.
fn write_if_changed(path: &Path, contents: &str) -> io::Result<bool> {
    if let Ok(existing) = fs::read(path) {
        if existing == contents.as_bytes() {
            return Ok(false);
        }
    }
    fs::write(path, contents)?;
    Ok(true)
}
