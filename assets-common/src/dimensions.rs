//! Pixel dimension inference for packaged images
//!
//! Package entries carry a width/height pair the device uses to lay out
//! images without decoding them. When the caller does not supply one it is
//! inferred from the payload:
//!
//! 1. Split-image formats (`.sjpg`, `.spng`, `.sqoi`) store width and height as
//!    little-endian u16 values at byte offsets 14 and 16.
//! 2. Standard rasters (`png`, `jpg`, `jpeg`, `gif`, `bmp`, `webp`) are probed
//!    for their natural size.
//! 3. Anything else is 0×0.

use std::io::Cursor;

use image::ImageReader;
use tracing::warn;

use crate::error::PackagingError;
use crate::packing::read_u16;

/// Extensions whose header embeds width/height at fixed offsets.
pub const SPLIT_IMAGE_EXTENSIONS: &[&str] = &["sjpg", "spng", "sqoi"];

/// Extensions probed with a raster decoder.
pub const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

const SPLIT_WIDTH_OFFSET: usize = 14;
const SPLIT_HEIGHT_OFFSET: usize = 16;

/// Image size stored in a directory entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u16,
    pub height: u16,
}

impl Dimensions {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Create from u32 dimensions, failing when either side exceeds u16.
    pub fn try_from_u32(width: u32, height: u32) -> Result<Self, PackagingError> {
        let side = |value: u32, what: &str| {
            u16::try_from(value).map_err(|_| PackagingError::Overflow {
                what: format!("image {} {}", what, value),
            })
        };
        Ok(Self {
            width: side(width, "width")?,
            height: side(height, "height")?,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.width == 0 && self.height == 0
    }
}

/// Infer the dimensions of `data`, using `filename`'s extension to pick a strategy.
pub fn infer_dimensions(filename: &str, data: &[u8]) -> Dimensions {
    let Some(ext) = extension_of(filename) else {
        return Dimensions::default();
    };
    let ext = ext.to_ascii_lowercase();

    if SPLIT_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return split_image_dimensions(filename, data);
    }
    if RASTER_EXTENSIONS.contains(&ext.as_str()) {
        return raster_dimensions(filename, data);
    }
    Dimensions::default()
}

fn split_image_dimensions(filename: &str, data: &[u8]) -> Dimensions {
    match (
        read_u16(data, SPLIT_WIDTH_OFFSET),
        read_u16(data, SPLIT_HEIGHT_OFFSET),
    ) {
        (Some(width), Some(height)) => Dimensions { width, height },
        _ => {
            warn!("Split image header too short in {}", filename);
            Dimensions::default()
        }
    }
}

fn raster_dimensions(filename: &str, data: &[u8]) -> Dimensions {
    let probed = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|reader| reader.into_dimensions());
    let size = match probed {
        Ok((width, height)) => Dimensions::try_from_u32(width, height),
        Err(e) => {
            warn!("Could not read image size of {}: {}", filename, e);
            return Dimensions::default();
        }
    };
    size.unwrap_or_else(|e| {
        warn!("Size of {} not recorded: {}", filename, e);
        Dimensions::default()
    })
}

/// Text after the last `.`, `None` when the name has no dot.
fn extension_of(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}
