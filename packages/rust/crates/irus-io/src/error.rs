//! Error types for source reading and output writing.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reading a source script or writing its converted output.
#[derive(Error, Debug)]
pub enum IoError {
    /// Nothing exists at the path, or it cannot be stat'ed.
    #[error("no such file: {}", .0.display())]
    NotFound(PathBuf),

    /// The path exists but is a directory.
    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    /// Source is larger than the configured limit.
    #[error("file too large: {size} bytes (limit: {limit})")]
    TooLarge {
        /// Actual size on disk.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    /// NUL bytes in the sniff window.
    #[error("binary content, not a script")]
    BinaryFile,

    /// Bytes are not UTF-8 (usually a cp1252-saved script).
    #[error("not valid UTF-8 (first bad byte at offset {valid_up_to})")]
    InvalidUtf8 {
        /// Length of the valid UTF-8 prefix.
        valid_up_to: usize,
    },

    /// Underlying OS error.
    #[error(transparent)]
    System(#[from] std::io::Error),
}
