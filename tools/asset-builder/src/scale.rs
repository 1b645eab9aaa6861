//! Emoji downscaling
//!
//! Custom emoji larger than the configured target are shrunk to fit inside it
//! while keeping their aspect ratio (never cropped). Raster images are drawn
//! centered on a canvas of exactly the target size; GIFs are re-encoded frame
//! by frame at the contained size.

use std::io::Cursor;

use assetpack_common::PackagingError;
use assetpack_shared::{ImageSize, ScalingConfig, ScalingMode};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};
use tracing::debug;

use crate::error::ConversionError;

/// GIF quantization speed (1 = best quality, 30 = fastest)
const GIF_QUANTIZE_SPEED: i32 = 10;

/// Shrinks an encoded image so it fits inside `target`.
pub trait ImageScale: Send + Sync {
    /// `extension` is the lower-cased source extension (`png`, `gif`, ...).
    fn scale(
        &self,
        data: &[u8],
        extension: &str,
        target: ImageSize,
    ) -> Result<Vec<u8>, ConversionError>;
}

/// Natural pixel size of an encoded image.
pub fn image_dimensions(data: &[u8]) -> Result<(u32, u32), ConversionError> {
    Ok(ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()?)
}

/// Largest size with the source aspect ratio that fits inside the target.
///
/// Returns `(width, height, ratio)`; both sides are at least 1 pixel.
pub fn contain_fit(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32, f32) {
    let ratio = (target_w as f32 / src_w.max(1) as f32).min(target_h as f32 / src_h.max(1) as f32);
    let fit = |side: u32, limit: u32| ((side as f32 * ratio).round() as u32).clamp(1, limit.max(1));
    (fit(src_w, target_w), fit(src_h, target_h), ratio)
}

/// Default [`ImageScale`] implementation, resampling with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmojiScaler {
    scaling: ScalingConfig,
}

impl EmojiScaler {
    pub fn new(scaling: ScalingConfig) -> Self {
        Self { scaling }
    }

    pub fn scaling(&self) -> &ScalingConfig {
        &self.scaling
    }

    /// Resample `image` to exactly `width` x `height`.
    fn resample(&self, image: &RgbaImage, width: u32, height: u32, ratio: f32) -> RgbaImage {
        let mode = self.scaling.mode_for_ratio(ratio);
        debug!(
            "Resampling {}x{} -> {}x{} ({:?}, ratio {:.3})",
            image.width(),
            image.height(),
            width,
            height,
            mode,
            ratio
        );
        match mode {
            ScalingMode::Pixelated => {
                match self.pixelated_midpoint(image.dimensions(), (width, height), ratio) {
                    Some((mid_w, mid_h)) => {
                        let mid = imageops::resize(image, mid_w, mid_h, FilterType::Nearest);
                        imageops::resize(&mid, width, height, FilterType::Triangle)
                    }
                    None => imageops::resize(image, width, height, FilterType::Nearest),
                }
            }
            ScalingMode::Sharp => imageops::resize(image, width, height, FilterType::Lanczos3),
            ScalingMode::Smooth | ScalingMode::Auto => {
                imageops::resize(image, width, height, FilterType::Triangle)
            }
        }
    }

    /// Intermediate size for a two-step pixelated downscale: nearest-neighbour
    /// halfway down, then smooth the rest. `None` above the smooth threshold.
    fn pixelated_midpoint(
        &self,
        (src_w, src_h): (u32, u32),
        (width, height): (u32, u32),
        ratio: f32,
    ) -> Option<(u32, u32)> {
        (ratio < self.scaling.smooth_threshold)
            .then(|| ((src_w / 2).max(width), (src_h / 2).max(height)))
    }

    fn scale_raster(
        &self,
        data: &[u8],
        extension: &str,
        target: ImageSize,
    ) -> Result<Vec<u8>, ConversionError> {
        let source = image::load_from_memory(data)?.to_rgba8();
        let (width, height, ratio) =
            contain_fit(source.width(), source.height(), target.width, target.height);
        let scaled = self.resample(&source, width, height, ratio);

        let format = ImageFormat::from_extension(extension).unwrap_or(ImageFormat::Png);
        let fill = match format {
            ImageFormat::Jpeg | ImageFormat::Bmp => Rgba([0xFF, 0xFF, 0xFF, 0xFF]),
            _ => Rgba([0, 0, 0, 0]),
        };
        let mut canvas = RgbaImage::from_pixel(target.width, target.height, fill);
        let x = (target.width - width) / 2;
        let y = (target.height - height) / 2;
        imageops::overlay(&mut canvas, &scaled, i64::from(x), i64::from(y));

        let output = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()),
            _ => DynamicImage::ImageRgba8(canvas),
        };
        let mut out = Cursor::new(Vec::new());
        output.write_to(&mut out, format)?;
        Ok(out.into_inner())
    }

    fn scale_gif(&self, data: &[u8], target: ImageSize) -> Result<Vec<u8>, ConversionError> {
        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(Cursor::new(data))?;

        let src_w = u32::from(decoder.width());
        let src_h = u32::from(decoder.height());
        let (width, height, ratio) = contain_fit(src_w, src_h, target.width, target.height);

        // Composite every frame onto a full canvas so partial frames scale correctly
        let mut canvas = RgbaImage::new(src_w, src_h);
        let mut frames: Vec<(RgbaImage, u16)> = Vec::new();
        while let Some(frame) = decoder.read_next_frame()? {
            let previous = (frame.dispose == gif::DisposalMethod::Previous).then(|| canvas.clone());
            let rect = FrameRect::of(frame, src_w, src_h);

            for (i, px) in frame.buffer.chunks_exact(4).enumerate() {
                if px[3] == 0 {
                    continue;
                }
                let x = u32::from(frame.left) + (i as u32 % u32::from(frame.width));
                let y = u32::from(frame.top) + (i as u32 / u32::from(frame.width));
                if x < src_w && y < src_h {
                    canvas.put_pixel(x, y, Rgba([px[0], px[1], px[2], px[3]]));
                }
            }

            frames.push((self.resample(&canvas, width, height, ratio), frame.delay));

            match frame.dispose {
                gif::DisposalMethod::Background => rect.clear(&mut canvas),
                gif::DisposalMethod::Previous => {
                    if let Some(previous) = previous {
                        canvas = previous;
                    }
                }
                gif::DisposalMethod::Any | gif::DisposalMethod::Keep => {}
            }
        }

        if frames.is_empty() {
            return Err(ConversionError::EmptyGif);
        }
        // Loop extension is only known once the stream has been read
        let repeat = decoder.repeat();

        let to_u16 = |side: u32| {
            u16::try_from(side).map_err(|_| PackagingError::Overflow {
                what: format!("GIF side {}", side),
            })
        };
        let (out_w, out_h) = (to_u16(width)?, to_u16(height)?);
        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, out_w, out_h, &[])?;
            encoder.set_repeat(repeat)?;
            for (mut image, delay) in frames {
                let mut frame = gif::Frame::from_rgba_speed(out_w, out_h, &mut image, GIF_QUANTIZE_SPEED);
                frame.delay = delay;
                frame.dispose = gif::DisposalMethod::Background;
                encoder.write_frame(&frame)?;
            }
        }
        Ok(out)
    }
}

/// Canvas area covered by one GIF frame, clipped to the logical screen.
struct FrameRect {
    left: u32,
    top: u32,
    right: u32,
    bottom: u32,
}

impl FrameRect {
    fn of(frame: &gif::Frame<'_>, screen_w: u32, screen_h: u32) -> Self {
        let left = u32::from(frame.left).min(screen_w);
        let top = u32::from(frame.top).min(screen_h);
        Self {
            left,
            top,
            right: (left + u32::from(frame.width)).min(screen_w),
            bottom: (top + u32::from(frame.height)).min(screen_h),
        }
    }

    fn clear(&self, canvas: &mut RgbaImage) {
        for y in self.top..self.bottom {
            for x in self.left..self.right {
                canvas.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
    }
}

impl ImageScale for EmojiScaler {
    fn scale(
        &self,
        data: &[u8],
        extension: &str,
        target: ImageSize,
    ) -> Result<Vec<u8>, ConversionError> {
        if extension == "gif" {
            self.scale_gif(data, target)
        } else {
            self.scale_raster(data, extension, target)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn gif(width: u16, height: u16, frames: &[[u8; 4]], delay: u16) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = gif::Encoder::new(&mut out, width, height, &[]).unwrap();
            encoder.set_repeat(gif::Repeat::Finite(3)).unwrap();
            for color in frames {
                let mut pixels: Vec<u8> = std::iter::repeat_n(*color, usize::from(width) * usize::from(height))
                    .flatten()
                    .collect();
                let mut frame = gif::Frame::from_rgba(width, height, &mut pixels);
                frame.delay = delay;
                encoder.write_frame(&frame).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_contain_fit() {
        assert_eq!(contain_fit(200, 100, 64, 64), (64, 32, 0.32));
        assert_eq!(contain_fit(100, 400, 64, 64), (16, 64, 0.16));
        let (w, h, _) = contain_fit(1000, 1, 10, 10);
        assert_eq!((w, h), (10, 1));
    }

    #[test]
    fn test_raster_letterboxed() {
        let scaler = EmojiScaler::default();
        let out = scaler
            .scale(&png(128, 64, [255, 0, 0, 255]), "png", ImageSize::new(64, 64))
            .unwrap();

        let image = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (64, 64));
        // 64x32 content centered vertically
        assert_eq!(image.get_pixel(0, 0)[3], 0);
        assert_eq!(image.get_pixel(32, 63)[3], 0);
        assert_eq!(*image.get_pixel(32, 32), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_jpeg_background_is_white() {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(40, 80, image::Rgb([0, 0, 0])))
            .write_to(&mut out, ImageFormat::Jpeg)
            .unwrap();

        let scaled = EmojiScaler::default()
            .scale(out.get_ref(), "jpg", ImageSize::new(20, 20))
            .unwrap();
        assert_eq!(image::guess_format(&scaled).unwrap(), ImageFormat::Jpeg);

        let image = image::load_from_memory(&scaled).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (20, 20));
        assert!(image.get_pixel(0, 10).0.iter().all(|&c| c > 200));
        assert!(image.get_pixel(10, 10).0.iter().all(|&c| c < 60));
    }

    #[test]
    fn test_every_mode_fits_target() {
        let source = png(256, 200, [0, 128, 255, 255]);
        for mode in [
            ScalingMode::Auto,
            ScalingMode::Smooth,
            ScalingMode::Sharp,
            ScalingMode::Pixelated,
        ] {
            let scaler = EmojiScaler::new(ScalingConfig {
                mode,
                ..ScalingConfig::default()
            });
            let out = scaler.scale(&source, "png", ImageSize::new(32, 32)).unwrap();
            assert_eq!(image_dimensions(&out).unwrap(), (32, 32), "{mode:?}");
        }
    }

    #[test]
    fn test_pixelated_midpoint_follows_smooth_threshold() {
        let pixelated = |smooth_threshold| {
            EmojiScaler::new(ScalingConfig {
                mode: ScalingMode::Pixelated,
                smooth_threshold,
                sharp_threshold: 0.1,
            })
        };

        // 100 -> 60 is a 0.6 ratio
        assert_eq!(pixelated(0.5).pixelated_midpoint((100, 100), (60, 60), 0.6), None);
        assert_eq!(
            pixelated(0.8).pixelated_midpoint((100, 100), (60, 60), 0.6),
            Some((60, 60))
        );
        assert_eq!(
            pixelated(0.8).pixelated_midpoint((256, 128), (32, 16), 0.125),
            Some((128, 64))
        );
    }

    #[test]
    fn test_gif_keeps_frames_and_timing() {
        let source = gif(100, 50, &[[255, 0, 0, 255], [0, 0, 255, 255]], 12);
        let out = EmojiScaler::default()
            .scale(&source, "gif", ImageSize::new(50, 50))
            .unwrap();

        let mut options = gif::DecodeOptions::new();
        options.set_color_output(gif::ColorOutput::RGBA);
        let mut decoder = options.read_info(Cursor::new(&out)).unwrap();
        assert_eq!((decoder.width(), decoder.height()), (50, 25));

        let mut delays = Vec::new();
        while let Some(frame) = decoder.read_next_frame().unwrap() {
            delays.push(frame.delay);
        }
        assert_eq!(delays, vec![12, 12]);
        assert_eq!(decoder.repeat(), gif::Repeat::Finite(3));
    }

    #[test]
    fn test_invalid_image_is_an_error() {
        let scaler = EmojiScaler::default();
        assert!(scaler.scale(b"not an image", "png", ImageSize::new(8, 8)).is_err());
        assert!(scaler.scale(b"not a gif", "gif", ImageSize::new(8, 8)).is_err());
    }
}
