//! Request-level checks run before anything touches the filesystem.

use std::path::{Component, Path};

/// Reject artifact names that could escape their directory.
///
/// A valid name is a single normal path component: no separators, no `..`,
/// no leading dot, no NUL.
pub fn is_safe_artifact_name(name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') {
        return false;
    }
    if name.contains(|c| c == '/' || c == '\\' || c == '\0') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Strip any client-side directory from a multipart file name.
pub fn base_file_name(name: &str) -> &str {
    name.rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(name)
        .trim()
}

/// `true` when `size` is within the inclusive ceiling.
pub fn within_upload_limit(size: u64, limit: u64) -> bool {
    size <= limit
}
