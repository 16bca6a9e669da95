//! Size-limited whole-file text reading.

use std::fs;
use std::io::Read;
use std::path::Path;

use crate::detect::decode_buffer;
use crate::error::IoError;

/// Default per-file size limit (1MB), matching the batch defaults.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Read a source file into memory with size and binary checks.
///
/// # Arguments
/// * `path` - Path to the file
/// * `max_bytes` - Maximum file size in bytes
///
/// # Errors
/// `NotFound` when the file cannot be stat'ed, `NotAFile` for directories,
/// `TooLarge` above `max_bytes`, `BinaryFile` for binary content and
/// `System` for other read failures.
pub fn read_text_safe<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<String, IoError> {
    let path = path.as_ref();

    let metadata = fs::metadata(path).map_err(|_| IoError::NotFound(path.to_path_buf()))?;

    if metadata.is_dir() {
        return Err(IoError::NotAFile(path.to_path_buf()));
    }
    if metadata.len() > max_bytes {
        return Err(IoError::TooLarge {
            size: metadata.len(),
            limit: max_bytes,
        });
    }

    let mut file = fs::File::open(path)?;
    let mut buffer = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or(0));
    file.read_to_end(&mut buffer)?;

    tracing::trace!(path = %path.display(), bytes = buffer.len(), "read source file");
    decode_buffer(buffer)
}
