//! Background image conversion
//!
//! Backgrounds are cover-fitted to the display (centered crop, no letterbox)
//! and stored as an LVGL RGB565 image so the device can draw them directly.

use assetpack_common::encode_rgb565_image;
use image::imageops::FilterType;
use tracing::debug;

use crate::error::ConversionError;

/// Convert an encoded image into a display-sized RGB565 `.raw` payload.
pub fn convert_background(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ConversionError> {
    let source = image::load_from_memory(data)?;
    let fitted = if source.width() == width && source.height() == height {
        source
    } else {
        debug!(
            "Cover-fitting background {}x{} -> {}x{}",
            source.width(),
            source.height(),
            width,
            height
        );
        source.resize_to_fill(width, height, FilterType::Triangle)
    };
    Ok(encode_rgb565_image(&fitted.to_rgba8())?)
}
