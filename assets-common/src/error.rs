//! Packaging errors shared by every format in this crate.

use thiserror::Error;

/// A package or model set could not be produced or decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackagingError {
    #[error("No files to package")]
    Empty,

    #[error("No model data to pack")]
    NoModels,

    #[error("Files '{first}' and '{second}' both pack to the name '{name}'")]
    NameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("{what} does not fit its field")]
    Overflow { what: String },

    #[error("Truncated {what}: need {needed} bytes, have {available}")]
    Truncated {
        what: String,
        needed: usize,
        available: usize,
    },

    #[error("Checksum mismatch: stored {stored:#06x}, computed {computed:#06x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Manifest references '{filename}' which is not in the package")]
    ManifestMismatch { filename: String },
}
