//! Tests for read module - size-limited source reading.

use std::io::Write;
use tempfile::TempDir;

use irus_io::{DEFAULT_MAX_FILE_SIZE, IoError, read_text_safe, write_text};

#[test]
fn test_read_python_source() {
    let dir = TempDir::new().expect("Create temp dir");
    let p = dir.path().join("fishing.py");
    std::fs::write(&p, "import pyautogui\n").expect("Write source");
    assert_eq!(
        read_text_safe(&p, DEFAULT_MAX_FILE_SIZE).expect("Read source"),
        "import pyautogui\n"
    );
}

#[test]
fn test_read_windows_line_endings() {
    let dir = TempDir::new().expect("Create temp dir");
    let p = dir.path().join("crlf.py");
    std::fs::write(&p, "import mss\r\nimport time\r\n").expect("Write source");
    assert_eq!(
        read_text_safe(&p, 1024).expect("Read source"),
        "import mss\nimport time\n"
    );
}

#[test]
fn test_binary_rejected() {
    let dir = TempDir::new().expect("Create temp dir");
    let p = dir.path().join("compiled.pyc");
    let mut file = std::fs::File::create(&p).expect("Create file");
    file.write_all(b"\x00\x01\x02\x03").expect("Write bytes");
    assert!(matches!(read_text_safe(&p, 1024), Err(IoError::BinaryFile)));
}

#[test]
fn test_file_too_large() {
    let dir = TempDir::new().expect("Create temp dir");
    let p = dir.path().join("large.py");
    std::fs::write(&p, "12345678901234567890").expect("Write source");
    assert!(matches!(read_text_safe(&p, 10), Err(IoError::TooLarge { size: 20, limit: 10 })));
}

#[test]
fn test_file_not_found() {
    let result = read_text_safe("/nonexistent/macro.py", 1024);
    assert!(matches!(result, Err(IoError::NotFound(_))));
}

#[test]
fn test_write_then_read() {
    let dir = TempDir::new().expect("Create temp dir");
    let p = dir.path().join("out").join("macro_macos.py");
    write_text(&p, "from pynput import mouse\n").expect("Write output");
    assert_eq!(
        read_text_safe(&p, 1024).expect("Read output"),
        "from pynput import mouse\n"
    );
}
