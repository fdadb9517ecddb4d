//! Write a rendered message to disk.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{ConvertError, Result};
use crate::mime::writer;
use crate::mime::MimeMessage;

/// Write `msg` to `destination`, creating parent directories as needed.
///
/// The document is rendered in memory, written to a temporary file next to
/// the destination and renamed over it, so a failed write never leaves a
/// truncated `.eml` behind. An existing file is replaced.
///
/// Returns the number of bytes written.
pub fn write_eml(msg: &MimeMessage, destination: &Path) -> Result<u64> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;

    let bytes = writer::to_bytes(msg);

    let mut tmp = temp_file_in(parent).map_err(|e| ConvertError::io(parent, e))?;
    tmp.write_all(&bytes)
        .and_then(|()| tmp.flush())
        .map_err(|e| ConvertError::io(tmp.path(), e))?;
    // A replaced file keeps its mode.
    if let Ok(existing) = std::fs::metadata(destination) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| ConvertError::io(tmp.path(), e))?;
    }
    tmp.persist(destination)
        .map_err(|e| ConvertError::io(destination, e.error))?;

    Ok(bytes.len() as u64)
}

/// Temporary file created with the same mode a plain `fs::write` would get
/// (0666 minus the umask) instead of tempfile's private 0600.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}
