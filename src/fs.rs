//! Whole-file helpers used by the commands.

use crate::error::{BuildError, BuildResult};
use log::info;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

pub fn read_file(path: &Path) -> BuildResult<String> {
    fs::read_to_string(path).map_err(BuildError::IoError)
}

/// Replaces `path` with `content` through a temporary file in the same
/// directory, so readers never observe a partially written file.
pub fn write_atomic(path: &Path, content: &str) -> BuildResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(BuildError::IoError)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(BuildError::IoError)?;
    temp.write_all(content.as_bytes())
        .map_err(BuildError::IoError)?;
    temp.as_file().sync_all().map_err(BuildError::IoError)?;
    temp.persist(path).map_err(|e| BuildError::IoError(e.error))?;
    Ok(())
}

/// Copies a file, creating the destination's parent directories.
pub fn copy_file(source: &Path, dest: &Path) -> BuildResult<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(BuildError::IoError)?;
    }
    fs::copy(source, dest)
        .map(|_| ())
        .map_err(BuildError::IoError)
}

/// Recursively copies the tree at `source` to `dest`.
pub fn copy_dir_all(source: &Path, dest: &Path) -> BuildResult<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| BuildError::IoError(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| BuildError::PostBuildError(e.to_string()))?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(BuildError::IoError)?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Removes a file or a whole directory tree. Missing paths are ignored.
pub fn remove_path(path: &Path) -> BuildResult<bool> {
    if path.is_dir() {
        info!("Removing directory '{}'", path.display());
        fs::remove_dir_all(path).map_err(BuildError::IoError)?;
    } else if path.exists() {
        info!("Removing file '{}'", path.display());
        fs::remove_file(path).map_err(BuildError::IoError)?;
    } else {
        return Ok(false);
    }
    Ok(true)
}
