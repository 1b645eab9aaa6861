//! Packing primitives
//!
//! Little-endian integer packing and fixed-width name fields shared by the
//! package directory and the model-set headers:
//! - u16/u32 → little-endian bytes
//! - name → zero-padded `[u8; 32]` (UTF-8 bytes or one byte per code point)
//! - 16-bit additive checksum

use assetpack_shared::PACKAGE_FORMAT;

use crate::error::PackagingError;

/// Width of every fixed name field.
pub const NAME_LEN: usize = PACKAGE_FORMAT.name_len;

/// Fixed-width name field.
pub type NameField = [u8; NAME_LEN];

// ============================================================================
// Integer Packing
// ============================================================================

/// Append a little-endian u32
#[inline]
pub fn pack_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Append a little-endian u16
#[inline]
pub fn pack_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Read a little-endian u32 at `offset`
#[inline]
pub fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let field = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([field[0], field[1], field[2], field[3]]))
}

/// Read a little-endian u16 at `offset`
#[inline]
pub fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let field = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([field[0], field[1]]))
}

/// Convert a length or offset to the format's u32 field width.
pub fn to_u32(value: usize, what: &str) -> Result<u32, PackagingError> {
    u32::try_from(value).map_err(|_| PackagingError::Overflow {
        what: what.to_string(),
    })
}

// ============================================================================
// Name Packing
// ============================================================================

/// Pack a name as its UTF-8 bytes, truncated to [`NAME_LEN`] and zero-padded.
///
/// Used by the package directory.
pub fn pack_name_utf8(name: &str) -> NameField {
    let mut field = [0u8; NAME_LEN];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Pack a name one byte per character, keeping the low 8 bits of each code point.
///
/// Used by model sets, whose reader expects raw 8-bit names. Code points above
/// 0xFF are masked, not rejected. Truncated to [`NAME_LEN`] characters.
pub fn pack_name_latin1(name: &str) -> NameField {
    let mut field = [0u8; NAME_LEN];
    for (slot, ch) in field.iter_mut().zip(name.chars()) {
        *slot = (u32::from(ch) & 0xFF) as u8;
    }
    field
}

/// Decode a name field, dropping the zero padding.
pub fn unpack_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

// ============================================================================
// Checksum
// ============================================================================

/// Unsigned sum of every byte across `parts`, modulo 65536.
pub fn checksum16<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> u16 {
    let sum = parts
        .into_iter()
        .flatten()
        .fold(0u32, |acc, &b| acc.wrapping_add(u32::from(b)));
    (sum & 0xFFFF) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_u32_little_endian() {
        let mut out = Vec::new();
        pack_u32(&mut out, 0x1234_5678);
        assert_eq!(out, [0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_pack_u16_little_endian() {
        let mut out = Vec::new();
        pack_u16(&mut out, 0xABCD);
        assert_eq!(out, [0xCD, 0xAB]);
    }

    #[test]
    fn test_read_out_of_bounds() {
        let bytes = [1u8, 2, 3];
        assert_eq!(read_u32(&bytes, 0), None);
        assert_eq!(read_u16(&bytes, 1), Some(0x0302));
        assert_eq!(read_u16(&bytes, 2), None);
        assert_eq!(read_u32(&bytes, usize::MAX), None);
    }

    #[test]
    fn test_pack_name_pads_with_zeros() {
        let field = pack_name_utf8("index.json");
        assert_eq!(&field[..10], b"index.json");
        assert!(field[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pack_name_truncates() {
        let long = "a".repeat(40);
        assert_eq!(pack_name_utf8(&long), [b'a'; NAME_LEN]);
        assert_eq!(pack_name_latin1(&long), [b'a'; NAME_LEN]);
    }

    #[test]
    fn test_latin1_masks_code_points() {
        // U+00E9 keeps its low byte, U+4F60 masks to 0x60
        let field = pack_name_latin1("é你");
        assert_eq!(field[0], 0xE9);
        assert_eq!(field[1], 0x60);
        assert_eq!(field[2], 0);
    }

    #[test]
    fn test_unpack_name() {
        assert_eq!(unpack_name(&pack_name_utf8("wn9_data")), "wn9_data");
        assert_eq!(unpack_name(&[b'x'; NAME_LEN]), "x".repeat(NAME_LEN));
    }

    #[test]
    fn test_checksum16_wraps() {
        let data = vec![0xFFu8; 300];
        let expected = (300u32 * 0xFF) & 0xFFFF;
        assert_eq!(u32::from(checksum16([data.as_slice()])), expected);
        assert_eq!(checksum16([&[1u8, 2][..], &[3u8][..]]), 6);
    }

    #[test]
    fn test_to_u32_overflow() {
        assert_eq!(to_u32(7, "size"), Ok(7));
        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            to_u32(usize::MAX, "size"),
            Err(PackagingError::Overflow { .. })
        ));
    }
}
