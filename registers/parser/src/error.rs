// Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Problems that make a whole descriptor unusable.
///
/// Anything local to one peripheral, register, or field is a
/// [`Warning`](crate::Warning) instead.
#[derive(Error, Debug)]
pub enum SvdError {
    #[error("SVD file '{}' not found", .0.display())]
    NotFound(PathBuf),

    #[error("'{}' is not a regular file", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot read SVD file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing SVD file: {0}")]
    Xml(#[from] xmltree::ParseError),
}

/// Result type for descriptor-level operations.
pub type Result<T> = std::result::Result<T, SvdError>;
