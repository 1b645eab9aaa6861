//! Binary formats for assetpack device packages
//!
//! This crate holds everything that must match the device byte for byte:
//!
//! # Modules
//!
//! - [`packing`] - Little-endian integers, fixed-width names, 16-bit checksum
//! - [`dimensions`] - Image size inference for directory entries
//! - [`formats`] - Package, model set and LVGL image encoders and readers
//! - [`error`] - [`PackagingError`]

pub mod dimensions;
pub mod error;
pub mod formats;
pub mod packing;

pub use dimensions::{Dimensions, infer_dimensions};
pub use error::PackagingError;

pub use formats::{
    DirectoryEntry, FILE_MARKER, LvImageHeader, ModelGroup, ModelMember, ModelSetEncoder,
    ModelSetReader, ModelSetStats, PackageEncoder, PackageEntry, PackageFile, PackageHeader,
    PackageReader, PackageStats, compare_names, encode_rgb565_image, pack_rgb565, sort_key,
};
