// ABOUTME: Utility functions for the image-deck application
// ABOUTME: Path validation and sorted directory listings shared by the pipeline

use crate::errors::{DeckError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Validate that a directory exists
pub fn validate_directory_exists(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(DeckError::NotFound(path.to_path_buf()));
    }
    Ok(())
}

/// Ensure a file's parent directory exists, creating it if necessary
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(|e| DeckError::io(parent, e))
        }
        _ => Ok(()),
    }
}

/// List a directory's entries sorted by file name.
///
/// Names compare by their raw OS string, which for UTF-8 names is code point order.
pub fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DeckError::io(dir, e))? {
        let entry = entry.map_err(|e| DeckError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Lowercased extension of a path, if any
pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// File name for log messages and titles
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
