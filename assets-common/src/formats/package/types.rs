//! Package header and directory entry records
//!
//! # Layout
//! ```text
//! Header (12 bytes):
//! 0x00: total_files u32
//! 0x04: checksum u32            (16-bit value, zero-extended)
//! 0x08: combined_data_length u32 (directory table + data section)
//!
//! Directory entry (44 bytes):
//! 0x00: name [u8; 32]           (UTF-8, zero-padded)
//! 0x20: size u32
//! 0x24: offset u32              (from data section start, points at marker)
//! 0x28: width u16
//! 0x2A: height u16
//! ```

use crate::dimensions::Dimensions;
use crate::packing::{NAME_LEN, NameField, read_u16, read_u32, unpack_name};

/// Package header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageHeader {
    pub total_files: u32,
    pub checksum: u32,
    pub combined_data_length: u32,
}

impl PackageHeader {
    pub const SIZE: usize = 12;

    pub fn new(total_files: u32, checksum: u16, combined_data_length: u32) -> Self {
        Self {
            total_files,
            checksum: u32::from(checksum),
            combined_data_length,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.total_files.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.combined_data_length.to_le_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Some(Self {
            total_files: read_u32(bytes, 0)?,
            checksum: read_u32(bytes, 4)?,
            combined_data_length: read_u32(bytes, 8)?,
        })
    }
}

/// Directory table entry (44 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: NameField,
    pub size: u32,
    pub offset: u32,
    pub width: u16,
    pub height: u16,
}

impl DirectoryEntry {
    pub const SIZE: usize = 44;

    pub fn new(name: NameField, size: u32, offset: u32, dimensions: Dimensions) -> Self {
        Self {
            name,
            size,
            offset,
            width: dimensions.width,
            height: dimensions.height,
        }
    }

    /// Name with the zero padding stripped
    pub fn name(&self) -> String {
        unpack_name(&self.name)
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Write entry to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..NAME_LEN].copy_from_slice(&self.name);
        bytes[32..36].copy_from_slice(&self.size.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.offset.to_le_bytes());
        bytes[40..42].copy_from_slice(&self.width.to_le_bytes());
        bytes[42..44].copy_from_slice(&self.height.to_le_bytes());
        bytes
    }

    /// Read entry from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(bytes.get(0..NAME_LEN)?);
        Some(Self {
            name,
            size: read_u32(bytes, 32)?,
            offset: read_u32(bytes, 36)?,
            width: read_u16(bytes, 40)?,
            height: read_u16(bytes, 42)?,
        })
    }
}
