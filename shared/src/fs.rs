//! Filesystem helpers shared by the build tools.

use std::io;
use std::path::Path;

/// Maximum size of a user-supplied font file.
pub const MAX_FONT_BYTES: u64 = 32 * 1024 * 1024; // 32 MiB
/// Maximum size of a user-supplied emoji or background image.
pub const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> io::Result<Vec<u8>> {
    let len = std::fs::metadata(path)?.len();
    if len > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "File too large: {} ({} bytes, max {} bytes)",
                path.display(),
                len,
                max_bytes
            ),
        ));
    }
    std::fs::read(path)
}

/// Lower-cased extension of a path or filename, if any.
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
