//! Device package wire formats
//!
//! - [`package`] - `assets.bin`, the flat file table the device mounts
//! - [`model_set`] - `srmodels.bin`, grouped wake-word model files
//! - [`lv_image`] - raw RGB565 images with an LVGL descriptor
//!
//! Field widths, field order, endianness, marker bytes and the checksum are
//! fixed by the device-side readers.

pub mod lv_image;
pub mod model_set;
pub mod package;

pub use lv_image::*;
pub use model_set::*;
pub use package::*;

// Re-export package format constants from shared for convenience
pub use assetpack_shared::{PACKAGE_FORMAT, PackageFormat};
