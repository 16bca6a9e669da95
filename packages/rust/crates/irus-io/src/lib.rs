#![allow(clippy::doc_markdown)]

//! irus-io - Safe text file I/O for IRUS conversions
//!
//! Reads whole source files into memory with size limits and binary
//! rejection, and writes converted output next to them.
//!
//! # Architecture
//!
//! ```text
//! irus-io/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # IoError enum
//! ├── detect.rs   # Binary detection & decoding
//! ├── read.rs     # Size-limited text reading
//! └── write.rs    # Output writing (creates parent directories)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use irus_io::{read_text_safe, write_text};
//!
//! let content = read_text_safe("macro.py", 1024 * 1024)?;
//! write_text("converted/macro_macos.py", &content)?;
//! ```

mod detect;
mod error;
mod read;
mod write;

pub use error::IoError;
pub use read::{DEFAULT_MAX_FILE_SIZE, read_text_safe};
pub use write::write_text;

// Re-export detection utilities for advanced use
pub use detect::{decode_buffer, is_binary};
