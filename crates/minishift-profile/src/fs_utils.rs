use std::fs;
use std::io;
use std::path::Path;

/// Writes `contents` only when nothing exists at `path` yet.
pub(crate) fn write_file_if_absent(path: &Path, contents: &[u8]) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, contents)?;
    Ok(true)
}
