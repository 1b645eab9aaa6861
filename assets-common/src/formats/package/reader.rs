//! Package decoding and verification

use super::FILE_MARKER;
use super::types::{DirectoryEntry, PackageHeader};
use crate::dimensions::Dimensions;
use crate::error::PackagingError;
use crate::packing::checksum16;

/// One decoded directory entry with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry<'a> {
    pub name: String,
    pub offset: u32,
    pub dimensions: Dimensions,
    pub data: &'a [u8],
}

impl PackageEntry<'_> {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Verified view over package bytes.
#[derive(Debug, Clone)]
pub struct PackageReader<'a> {
    header: PackageHeader,
    entries: Vec<PackageEntry<'a>>,
}

impl<'a> PackageReader<'a> {
    /// Decode and verify a package.
    ///
    /// Checks the declared lengths, the checksum, and every entry's bounds and
    /// marker bytes.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, PackagingError> {
        let header = PackageHeader::from_bytes(bytes).ok_or(PackagingError::Truncated {
            what: "package header".to_string(),
            needed: PackageHeader::SIZE,
            available: bytes.len(),
        })?;

        let combined = &bytes[PackageHeader::SIZE..];
        let combined_len = header.combined_data_length as usize;
        if combined.len() < combined_len {
            return Err(PackagingError::Truncated {
                what: "package body".to_string(),
                needed: combined_len,
                available: combined.len(),
            });
        }
        let combined = &combined[..combined_len];

        let table_len = (header.total_files as usize)
            .checked_mul(DirectoryEntry::SIZE)
            .filter(|&len| len <= combined_len)
            .ok_or_else(|| {
                PackagingError::InvalidLayout(format!(
                    "{} directory entries do not fit in {} bytes",
                    header.total_files, combined_len
                ))
            })?;

        let computed = u32::from(checksum16([combined]));
        if computed != header.checksum {
            return Err(PackagingError::ChecksumMismatch {
                stored: header.checksum,
                computed,
            });
        }

        let (table, data) = combined.split_at(table_len);
        let mut entries = Vec::with_capacity(header.total_files as usize);
        for raw in table.chunks_exact(DirectoryEntry::SIZE) {
            let entry = DirectoryEntry::from_bytes(raw).ok_or_else(|| {
                PackagingError::InvalidLayout("short directory entry".to_string())
            })?;
            entries.push(Self::resolve(&entry, data)?);
        }

        Ok(Self { header, entries })
    }

    fn resolve(entry: &DirectoryEntry, data: &'a [u8]) -> Result<PackageEntry<'a>, PackagingError> {
        let name = entry.name();
        let marker_start = entry.offset as usize;
        let payload_start = marker_start + FILE_MARKER.len();
        let payload_end = payload_start + entry.size as usize;
        if payload_end > data.len() {
            return Err(PackagingError::InvalidLayout(format!(
                "'{}' spans {}..{} past the {}-byte data section",
                name,
                marker_start,
                payload_end,
                data.len()
            )));
        }
        if data[marker_start..payload_start] != FILE_MARKER {
            return Err(PackagingError::InvalidLayout(format!(
                "missing marker before '{}' at offset {}",
                name, marker_start
            )));
        }
        Ok(PackageEntry {
            name,
            offset: entry.offset,
            dimensions: entry.dimensions(),
            data: &data[payload_start..payload_end],
        })
    }

    pub fn header(&self) -> &PackageHeader {
        &self.header
    }

    /// Entries in directory order
    pub fn entries(&self) -> &[PackageEntry<'a>] {
        &self.entries
    }

    pub fn find(&self, name: &str) -> Option<&PackageEntry<'a>> {
        self.entries.iter().find(|e| e.name == name)
    }
}
