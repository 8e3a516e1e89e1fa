//! Output directory helpers

use std::path::Path;

/// Create `path` and every missing parent directory.
///
/// Safe to call repeatedly. Fails if creation is refused for any reason
/// other than the directory already existing, including when `path` is an
/// existing regular file.
pub fn ensure_dir(path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    std::fs::create_dir_all(path)?;
    tracing::debug!("Ensured directory {}", path.display());
    Ok(())
}

/// Ensure the parent directory of a file path exists.
///
/// Paths without a parent component (a bare file name) are left alone.
pub fn ensure_parent_dir(file: impl AsRef<Path>) -> std::io::Result<()> {
    match file.as_ref().parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}
