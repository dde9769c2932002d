//! Storage path rules.
//!
//! Paths are slash-delimited and relative to the storage root. A path that
//! is absolute or contains a `..` segment never reaches the backend.

use crate::core::constants::RESERVED_PATHS;
use crate::error::{Result, StorageError, ValidationError};

/// Normalize a storage-relative path.
///
/// Empty and `.` segments are dropped; the result has no leading or
/// trailing slash.
///
/// # Errors
///
/// Returns `StorageError::NotLocal` for absolute paths or `..` segments,
/// and `ValidationError::EmptyPath` when nothing remains.
pub fn normalize(path: &str) -> Result<String> {
    let normalized = normalize_root(path)?;
    if normalized.is_empty() {
        return Err(ValidationError::EmptyPath.into());
    }
    Ok(normalized)
}

/// Like [`normalize`], but an empty result denotes the storage root.
pub fn normalize_root(path: &str) -> Result<String> {
    if path.starts_with('/') || path.starts_with('\\') || path.contains('\0') {
        return Err(StorageError::NotLocal(path.to_string()).into());
    }

    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(StorageError::NotLocal(path.to_string()).into()),
            s if s.contains('\\') => return Err(StorageError::NotLocal(path.to_string()).into()),
            s => segments.push(s),
        }
    }

    Ok(segments.join("/"))
}

/// Whether a normalized path is, or is nested under, a storage-internal name.
pub fn is_reserved(normalized: &str) -> bool {
    let first = normalized.split('/').next().unwrap_or_default();
    RESERVED_PATHS.contains(&first)
}

/// Join a base path and a child name.
pub fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}

/// Whether `path` lies strictly inside `ancestor`.
pub fn is_nested(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}
