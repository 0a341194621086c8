// Persists the processed image. Bytes go to a temporary file next to the
// destination which is then renamed over it, so the destination either
// holds the full response or is left untouched.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Write `bytes` to `dst`, creating or replacing it. The parent directory
/// must already exist.
///
/// A symlink at `dst` is written through to its target. An existing file
/// keeps its permissions; a new one is created as 0644 minus the umask.
pub fn save_output(dst: &Path, bytes: &[u8]) -> Result<()> {
    let write_err = |source: std::io::Error| Error::Write {
        path: dst.to_path_buf(),
        source,
    };

    let target = resolve_target(dst);
    let existing = fs::metadata(&target)
        .ok()
        .filter(|m| m.is_file())
        .map(|m| m.permissions());
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".background-erase-").suffix(".part");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }

    let mut tmp = builder.tempfile_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    if let Some(perms) = existing {
        fs::set_permissions(tmp.path(), perms).map_err(write_err)?;
    }

    tmp.persist(&target).map_err(|e| write_err(e.error))?;
    debug!(path = %target.display(), bytes = bytes.len(), "output written");
    Ok(())
}

// Dangling links are replaced rather than followed.
fn resolve_target(dst: &Path) -> PathBuf {
    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::canonicalize(dst).unwrap_or_else(|_| dst.to_path_buf())
        }
        _ => dst.to_path_buf(),
    }
}
