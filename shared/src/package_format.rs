//! Package format constants for assetpack device packages.
//!
//! This module defines the `PackageFormat` struct which serves as the single source of truth
//! for every layout constant shared between the encoders and the device-side reader
//! (field widths, marker bytes, conventional filenames).
//!
//! These values are a wire contract: changing any of them breaks every device already
//! in the field.
//!
//! # Example
//!
//! ```
//! use assetpack_shared::PACKAGE_FORMAT;
//!
//! assert_eq!(PACKAGE_FORMAT.output_name, "assets.bin");
//! assert_eq!(PACKAGE_FORMAT.name_len, 32);
//! assert_eq!(PACKAGE_FORMAT.marker, [0x5A, 0x5A]);
//! ```

/// Layout constants of the package and its embedded files.
#[derive(Debug, Clone, Copy)]
pub struct PackageFormat {
    /// Conventional package filename
    pub output_name: &'static str,

    /// Filename of the embedded JSON manifest
    pub manifest_name: &'static str,

    /// Filename of the aggregated wake-word model blob
    pub srmodels_name: &'static str,

    /// Manifest schema version written to `index.json`
    pub manifest_version: u32,

    /// Width of every fixed name field (directory entries and model sets)
    pub name_len: usize,

    /// Marker preceding every payload in the data section
    pub marker: [u8; 2],

    /// Package header size (total_files, checksum, combined_data_length)
    pub header_size: usize,

    /// Directory entry size (name, size, offset, width, height)
    pub entry_size: usize,
}

impl PackageFormat {
    /// Create a new package format definition.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        output_name: &'static str,
        manifest_name: &'static str,
        srmodels_name: &'static str,
        manifest_version: u32,
        name_len: usize,
        marker: [u8; 2],
        header_size: usize,
        entry_size: usize,
    ) -> Self {
        Self {
            output_name,
            manifest_name,
            srmodels_name,
            manifest_version,
            name_len,
            marker,
            header_size,
            entry_size,
        }
    }
}

/// The device package format.
///
/// - Package file: `assets.bin`
/// - Manifest: `index.json`
/// - Wake-word models: `srmodels.bin`
/// - Directory entry: 32-byte name + u32 size + u32 offset + u16 width + u16 height
pub const PACKAGE_FORMAT: PackageFormat = PackageFormat::new(
    "assets.bin",
    "index.json",
    "srmodels.bin",
    1,
    32,
    [0x5A, 0x5A],
    12,
    44,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_format_names() {
        assert_eq!(PACKAGE_FORMAT.output_name, "assets.bin");
        assert_eq!(PACKAGE_FORMAT.manifest_name, "index.json");
        assert_eq!(PACKAGE_FORMAT.srmodels_name, "srmodels.bin");
    }

    #[test]
    fn test_entry_size_matches_fields() {
        // name[32] + size u32 + offset u32 + width u16 + height u16
        assert_eq!(PACKAGE_FORMAT.entry_size, PACKAGE_FORMAT.name_len + 4 + 4 + 2 + 2);
    }

    #[test]
    fn test_header_size() {
        // total_files + checksum + combined_data_length
        assert_eq!(PACKAGE_FORMAT.header_size, 3 * 4);
    }
}
