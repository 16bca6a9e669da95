//! Output writing for converted files.

use std::fs;
use std::path::Path;

use crate::error::IoError;

/// Write converted text to `path`, creating missing parent directories.
///
/// # Errors
/// Returns `IoError::System` if the directory cannot be created or the file
/// cannot be written.
pub fn write_text<P: AsRef<Path>>(path: P, content: &str) -> Result<(), IoError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    tracing::trace!(path = %path.display(), bytes = content.len(), "wrote output file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_parent_directories() {
        let dir = TempDir::new().expect("Create temp dir");
        let target = dir.path().join("converted_batch").join("bot_macos.py");
        write_text(&target, "print('ok')\n").expect("Write output");
        assert_eq!(
            fs::read_to_string(&target).expect("Read output"),
            "print('ok')\n"
        );
    }

    #[test]
    fn test_write_into_file_parent_fails() {
        let dir = TempDir::new().expect("Create temp dir");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").expect("Write blocker");
        let result = write_text(blocker.join("out.py"), "x");
        assert!(matches!(result, Err(IoError::System(_))));
    }
}
