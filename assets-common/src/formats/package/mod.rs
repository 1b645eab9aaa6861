//! Asset package format (`assets.bin`)
//!
//! A flat, read-only file table consumed by the device's memory-mapped asset
//! partition. Every integer is little-endian.
//!
//! # Layout
//! ```text
//! PackageHeader          12 bytes
//! DirectoryEntry[n]      44 bytes each, sorted by (extension, base name)
//! data section           per file: 0x5A 0x5A marker + payload
//! ```
//!
//! Directory offsets are relative to the start of the data section and point
//! at each file's marker. The header checksum is the 16-bit sum of every byte
//! in the directory table and data section.

mod reader;
mod types;


pub use reader::{PackageEntry, PackageReader};
pub use types::{DirectoryEntry, PackageHeader};

use std::cmp::Ordering;
use std::collections::BTreeMap;

use assetpack_shared::PACKAGE_FORMAT;
use hashbrown::HashMap;
use tracing::{debug, warn};

use crate::dimensions::{Dimensions, infer_dimensions};
use crate::error::PackagingError;
use crate::packing::{NAME_LEN, NameField, checksum16, pack_name_utf8, to_u32, unpack_name};

/// Marker written before every payload in the data section.
pub const FILE_MARKER: [u8; 2] = PACKAGE_FORMAT.marker;

/// One file queued for packaging
#[derive(Debug, Clone)]
pub struct PackageFile {
    pub name: String,
    pub data: Vec<u8>,
    /// Caller-supplied size, inferred at generate time when `None`
    pub dimensions: Option<Dimensions>,
}

/// Summary of the queued files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageStats {
    pub file_count: usize,
    pub total_size: usize,
    /// File count per lower-cased extension
    pub file_types: BTreeMap<String, usize>,
    pub average_file_size: usize,
}

/// Builds `assets.bin` from named byte blobs.
///
/// Queue files with [`add_file`](Self::add_file), then call
/// [`generate`](Self::generate). The encoder keeps its queue after generating;
/// call [`clear`](Self::clear) before reusing it for another package.
#[derive(Debug, Default)]
pub struct PackageEncoder {
    files: Vec<PackageFile>,
}

/// A file positioned in the data section
struct Placed<'a> {
    file: &'a PackageFile,
    entry: DirectoryEntry,
}

impl PackageEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one file. Names longer than 32 bytes are truncated when packed.
    pub fn add_file(&mut self, name: impl Into<String>, data: Vec<u8>, dimensions: Option<Dimensions>) {
        let name = name.into();
        if name.len() > NAME_LEN {
            warn!(
                "File name '{}' exceeds {} bytes and will be truncated",
                name, NAME_LEN
            );
        }
        self.files.push(PackageFile {
            name,
            data,
            dimensions,
        });
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[PackageFile] {
        &self.files
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn stats(&self) -> PackageStats {
        let total_size: usize = self.files.iter().map(|f| f.data.len()).sum();
        let mut file_types = BTreeMap::new();
        for file in &self.files {
            let ext = file
                .name
                .rsplit('.')
                .next()
                .filter(|ext| !ext.is_empty())
                .map(str::to_lowercase)
                .unwrap_or_else(|| "unknown".to_string());
            *file_types.entry(ext).or_insert(0) += 1;
        }
        let average_file_size = if self.files.is_empty() {
            0
        } else {
            (total_size + self.files.len() / 2) / self.files.len()
        };

        PackageStats {
            file_count: self.files.len(),
            total_size,
            file_types,
            average_file_size,
        }
    }

    /// Encode the queued files into package bytes.
    pub fn generate(&self) -> Result<Vec<u8>, PackagingError> {
        self.generate_with_progress(&mut |_, _| {})
    }

    /// Encode the queued files, reporting non-decreasing percentages (0-100).
    pub fn generate_with_progress(
        &self,
        progress: &mut dyn FnMut(f32, &str),
    ) -> Result<Vec<u8>, PackagingError> {
        if self.files.is_empty() {
            return Err(PackagingError::Empty);
        }
        progress(0.0, "Packaging files");

        let mut sorted: Vec<&PackageFile> = self.files.iter().collect();
        sorted.sort_by(|a, b| compare_names(&a.name, &b.name));
        check_name_collisions(&sorted)?;

        let total = sorted.len();
        let mut placed = Vec::with_capacity(total);
        let mut data_len = 0usize;
        for (i, file) in sorted.into_iter().enumerate() {
            progress(
                10.0 + (i as f32 / total as f32) * 30.0,
                &format!("Processing {}", file.name),
            );
            let dimensions = match file.dimensions {
                Some(dims) if !dims.is_zero() => dims,
                _ => infer_dimensions(&file.name, &file.data),
            };
            let entry = DirectoryEntry::new(
                pack_name_utf8(&file.name),
                to_u32(file.data.len(), &format!("size of {}", file.name))?,
                to_u32(data_len, "data section offset")?,
                dimensions,
            );
            debug!(
                "{} -> offset {} size {} ({}x{})",
                file.name, entry.offset, entry.size, entry.width, entry.height
            );
            placed.push(Placed { file, entry });
            data_len += FILE_MARKER.len() + file.data.len();
        }

        progress(40.0, "Building directory table");
        let mut table = Vec::with_capacity(total * DirectoryEntry::SIZE);
        for p in &placed {
            table.extend_from_slice(&p.entry.to_bytes());
        }

        progress(60.0, "Merging file data");
        let mut data = Vec::with_capacity(data_len);
        for (i, p) in placed.iter().enumerate() {
            progress(
                60.0 + (i as f32 / total as f32) * 20.0,
                &format!("Merging {}", p.file.name),
            );
            data.extend_from_slice(&FILE_MARKER);
            data.extend_from_slice(&p.file.data);
        }

        progress(80.0, "Computing checksum");
        let checksum = checksum16([table.as_slice(), data.as_slice()]);
        let combined_len = table.len() + data.len();

        progress(90.0, "Writing package");
        let header = PackageHeader::new(
            to_u32(total, "file count")?,
            checksum,
            to_u32(combined_len, "combined data length")?,
        );
        let mut out = Vec::with_capacity(PackageHeader::SIZE + combined_len);
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&table);
        out.extend_from_slice(&data);

        progress(100.0, "Packaging complete");
        Ok(out)
    }
}

/// Split a file name into its directory sort key: (extension, base name).
///
/// The extension is the text after the last `.` (the whole name when there
/// is none). The base name drops the last extension when it is non-empty.
pub fn sort_key(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((base, ext)) if !ext.is_empty() => (ext, base),
        Some((_, ext)) => (ext, name),
        None => (name, name),
    }
}

/// Directory order: extension first, then base name, byte-wise and case-sensitive.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn check_name_collisions(files: &[&PackageFile]) -> Result<(), PackagingError> {
    let mut seen: HashMap<NameField, &str> = HashMap::with_capacity(files.len());
    for file in files {
        let packed = pack_name_utf8(&file.name);
        if let Some(first) = seen.insert(packed, &file.name) {
            return Err(PackagingError::NameCollision {
                name: unpack_name(&packed),
                first: first.to_string(),
                second: file.name.clone(),
            });
        }
    }
    Ok(())
}
