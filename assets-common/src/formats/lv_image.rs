//! Raw RGB565 image with an LVGL image descriptor
//!
//! Backgrounds are stored pre-converted so the device's graphics runtime can
//! blit them straight from flash.
//!
//! # Layout
//! ```text
//! 0x00: magic u8 (0x19) | color_format u8 (0x12 = RGB565) | flags u16 (0)
//! 0x04: width u16 | height u16
//! 0x08: stride u16 (width * 2) | reserved u16
//! 0x0C: data_size u32
//! 0x10: data_offset u32 (28)
//! 0x14: reserved u32
//! 0x18: reserved u32
//! 0x1C: pixels, one little-endian u16 per pixel, row-major
//! ```

use image::RgbaImage;

use crate::error::PackagingError;
use crate::packing::read_u32;

/// LVGL image header magic byte
pub const LV_IMAGE_HEADER_MAGIC: u8 = 0x19;

/// LVGL color format tag for RGB565
pub const LV_COLOR_FORMAT_RGB565: u8 = 0x12;

/// Bytes per RGB565 pixel
pub const RGB565_BYTES_PER_PIXEL: usize = 2;

/// LVGL image descriptor (28 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LvImageHeader {
    pub magic: u8,
    pub color_format: u8,
    pub width: u16,
    pub height: u16,
    pub stride: u16,
    pub data_size: u32,
    pub data_offset: u32,
}

impl LvImageHeader {
    pub const SIZE: usize = 28;

    /// Descriptor for an RGB565 image of the given size
    pub fn rgb565(width: u16, height: u16) -> Self {
        let stride = u32::from(width) * RGB565_BYTES_PER_PIXEL as u32;
        Self {
            magic: LV_IMAGE_HEADER_MAGIC,
            color_format: LV_COLOR_FORMAT_RGB565,
            width,
            height,
            stride: stride as u16,
            data_size: stride * u32::from(height),
            data_offset: Self::SIZE as u32,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let words = [
            u32::from(self.magic) | (u32::from(self.color_format) << 8),
            u32::from(self.width) | (u32::from(self.height) << 16),
            u32::from(self.stride),
            self.data_size,
            self.data_offset,
            0,
            0,
        ];
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let format = read_u32(bytes, 0)?;
        let size = read_u32(bytes, 4)?;
        Some(Self {
            magic: (format & 0xFF) as u8,
            color_format: ((format >> 8) & 0xFF) as u8,
            width: (size & 0xFFFF) as u16,
            height: (size >> 16) as u16,
            stride: (read_u32(bytes, 8)? & 0xFFFF) as u16,
            data_size: read_u32(bytes, 12)?,
            data_offset: read_u32(bytes, 16)?,
        })
    }
}

/// Pack an 8-bit RGB color into RGB565.
#[inline]
pub fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r >> 3) << 11) | (u16::from(g >> 2) << 5) | u16::from(b >> 3)
}

/// Encode an image as descriptor + RGB565 pixels.
///
/// Translucent pixels are composited over black.
pub fn encode_rgb565_image(image: &RgbaImage) -> Result<Vec<u8>, PackagingError> {
    let width = u16::try_from(image.width()).map_err(|_| PackagingError::Overflow {
        what: format!("image width {}", image.width()),
    })?;
    let height = u16::try_from(image.height()).map_err(|_| PackagingError::Overflow {
        what: format!("image height {}", image.height()),
    })?;
    // stride is a 16-bit field
    if usize::from(width) * RGB565_BYTES_PER_PIXEL > usize::from(u16::MAX) {
        return Err(PackagingError::Overflow {
            what: format!("row stride for width {}", width),
        });
    }

    let header = LvImageHeader::rgb565(width, height);
    let mut out = Vec::with_capacity(LvImageHeader::SIZE + header.data_size as usize);
    out.extend_from_slice(&header.to_bytes());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let over_black = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
        let packed = pack_rgb565(over_black(r), over_black(g), over_black(b));
        out.extend_from_slice(&packed.to_le_bytes());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_pack_rgb565() {
        assert_eq!(pack_rgb565(0xFF, 0x00, 0x00), 0xF800);
        assert_eq!(pack_rgb565(0x00, 0xFF, 0x00), 0x07E0);
        assert_eq!(pack_rgb565(0x00, 0x00, 0xFF), 0x001F);
        assert_eq!(pack_rgb565(0xFF, 0xFF, 0xFF), 0xFFFF);
        assert_eq!(pack_rgb565(0x07, 0x03, 0x07), 0x0000);
    }

    #[test]
    fn test_header_words() {
        let bytes = LvImageHeader::rgb565(320, 240).to_bytes();
        assert_eq!(read_u32(&bytes, 0), Some(0x0000_1219));
        assert_eq!(read_u32(&bytes, 4), Some(320 | (240 << 16)));
        assert_eq!(read_u32(&bytes, 8), Some(640));
        assert_eq!(read_u32(&bytes, 12), Some(320 * 240 * 2));
        assert_eq!(read_u32(&bytes, 16), Some(28));
        assert_eq!(read_u32(&bytes, 20), Some(0));
        assert_eq!(read_u32(&bytes, 24), Some(0));
    }

    #[test]
    fn test_header_round_trip() {
        let header = LvImageHeader::rgb565(128, 64);
        assert_eq!(LvImageHeader::from_bytes(&header.to_bytes()), Some(header));
        assert!(LvImageHeader::from_bytes(&[0; 27]).is_none());
    }

    #[test]
    fn test_solid_red_image() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([0xFF, 0x00, 0x00, 0xFF]));
        let raw = encode_rgb565_image(&image).unwrap();
        assert_eq!(raw.len(), LvImageHeader::SIZE + 4 * 4 * 2);

        let header = LvImageHeader::from_bytes(&raw).unwrap();
        assert_eq!(header, LvImageHeader::rgb565(4, 4));
        for px in raw[LvImageHeader::SIZE..].chunks_exact(2) {
            assert_eq!(u16::from_le_bytes([px[0], px[1]]), 0xF800);
        }
    }

    #[test]
    fn test_transparent_pixels_are_black() {
        let image = RgbaImage::from_pixel(2, 1, Rgba([0xFF, 0xFF, 0xFF, 0x00]));
        let raw = encode_rgb565_image(&image).unwrap();
        assert!(raw[LvImageHeader::SIZE..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_oversized_width_rejected() {
        let image = RgbaImage::new(40_000, 1);
        assert!(matches!(
            encode_rgb565_image(&image),
            Err(PackagingError::Overflow { .. })
        ));
    }
}
