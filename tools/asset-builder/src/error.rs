//! Build error taxonomy

use std::path::PathBuf;

use assetpack_common::PackagingError;
use assetpack_shared::ConfigValidationError;
use thiserror::Error;

/// Retrieval of a preset or user-supplied resource failed.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to create runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// A font or image conversion collaborator failed.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Font converter not available: {0}")]
    ConverterUnavailable(String),
    #[error("Font converter failed: {0}")]
    FontConverter(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("GIF decode error: {0}")]
    GifDecode(#[from] gif::DecodingError),
    #[error("GIF encode error: {0}")]
    GifEncode(#[from] gif::EncodingError),
    #[error("GIF has no frames")]
    EmptyGif,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid output: {0}")]
    Packaging(#[from] PackagingError),
    #[error("Manifest serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// A build failed. Per-resource failures name the package file they were producing.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Invalid configuration: {0}")]
    ConfigValidation(#[from] ConfigValidationError),

    #[error("Failed to fetch resource for {filename}: {source}")]
    ResourceFetch {
        filename: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to convert {filename}: {source}")]
    Conversion {
        filename: String,
        #[source]
        source: ConversionError,
    },

    #[error("Packaging failed: {0}")]
    Packaging(#[from] PackagingError),
}

impl BuildError {
    pub fn fetch(filename: impl Into<String>, source: FetchError) -> Self {
        Self::ResourceFetch {
            filename: filename.into(),
            source,
        }
    }

    pub fn conversion(filename: impl Into<String>, source: impl Into<ConversionError>) -> Self {
        Self::Conversion {
            filename: filename.into(),
            source: source.into(),
        }
    }

    /// Package file the failure belongs to, when it is resource-specific.
    pub fn filename(&self) -> Option<&str> {
        match self {
            Self::ResourceFetch { filename, .. } | Self::Conversion { filename, .. } => {
                Some(filename)
            }
            Self::Packaging(PackagingError::ManifestMismatch { filename }) => Some(filename),
            Self::ConfigValidation(_) | Self::Packaging(_) => None,
        }
    }
}
