//! Tests for detect module - binary sniffing and source decoding.

use irus_io::{IoError, decode_buffer, is_binary};

#[test]
fn test_compiled_bytecode_is_binary() {
    // .pyc magic followed by NUL padding
    assert!(is_binary(b"\x55\x0d\x0d\x0a\x00\x00\x00\x00"));
    assert!(!is_binary(b"import keyboard\nkeyboard.press('a')\n"));
    assert!(!is_binary(b""));
}

#[test]
fn test_decode_rejects_binary() {
    let result = decode_buffer(b"MZ\x90\x00\x03".to_vec());
    assert!(matches!(result, Err(IoError::BinaryFile)));
}

#[test]
fn test_cp1252_script_is_rejected() {
    // cp1252 "é" in a comment
    let result = decode_buffer(b"# caf\xe9\nx = 1\n".to_vec());
    assert!(matches!(result, Err(IoError::InvalidUtf8 { valid_up_to: 5 })));
}

#[test]
fn test_notepad_saved_script() {
    let result = decode_buffer(b"\xEF\xBB\xBFimport win32api\r\nx = 1\r\n".to_vec())
        .expect("Decode");
    assert_eq!(result, "import win32api\nx = 1\n");
}
