//! Binary detection and text decoding.
//!
//! Windows-authored scripts usually arrive with a UTF-8 BOM and CRLF line
//! endings; both are normalised away so rewrite rules only ever see `\n`.

use memchr::memchr;

use crate::error::IoError;

const BINARY_SNIFF_LEN: usize = 8192;
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Quick binary detection - checks the first 8KB for NULL bytes.
#[must_use]
pub fn is_binary(buffer: &[u8]) -> bool {
    let check_len = buffer.len().min(BINARY_SNIFF_LEN);
    memchr(0, &buffer[..check_len]).is_some()
}

/// Decode a source file buffer into text.
///
/// Rejects binary content and invalid UTF-8, strips a leading UTF-8 BOM and
/// translates `\r\n` and lone `\r` line endings to `\n`.
///
/// # Errors
/// `IoError::BinaryFile` when binary content is detected,
/// `IoError::InvalidUtf8` when the bytes are not UTF-8 (cp1252 scripts).
pub fn decode_buffer(mut buffer: Vec<u8>) -> Result<String, IoError> {
    if is_binary(&buffer) {
        return Err(IoError::BinaryFile);
    }

    if buffer.starts_with(UTF8_BOM) {
        buffer.drain(..UTF8_BOM.len());
    }
    let text = String::from_utf8(buffer).map_err(|e| IoError::InvalidUtf8 {
        valid_up_to: e.utf8_error().valid_up_to(),
    })?;

    Ok(normalize_newlines(text))
}

fn normalize_newlines(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}
