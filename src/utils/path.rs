//! Filesystem path normalization.

use std::path::{Path, PathBuf};

/// Expand `~` and resolve `path` against `base` when it is relative.
///
/// The result is canonicalized when it exists on disk, otherwise it is
/// returned joined but untouched.
///
/// # Example
/// ```ignore
/// let input = normalize_path(Path::new("input_files"), Path::new("/blog"));
/// assert_eq!(input, PathBuf::from("/blog/input_files"));
/// ```
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    joined.canonicalize().unwrap_or(joined)
}
