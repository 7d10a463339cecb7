//! Solution directory discovery.
//! Walks upward from a starting directory without touching the process
//! working directory and seeds the `Solution*` variables.

use crate::constants::{SOLUTION_MARKER, SOLUTION_SEARCH_DEPTH};
use crate::error::{BuildError, BuildResult};
use crate::paths::with_trailing_separator;
use crate::variables::Variables;
use globset::{Glob, GlobMatcher};
use log::{debug, warn};
use std::path::{Path, PathBuf};

fn marker() -> BuildResult<GlobMatcher> {
    Glob::new(SOLUTION_MARKER)
        .map(|g| g.compile_matcher())
        .map_err(|e| BuildError::GlobError(e.to_string()))
}

/// Solution files directly inside `dir`, sorted by name.
fn solution_files(dir: &Path, matcher: &GlobMatcher) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| path.file_name().is_some_and(|name| matcher.is_match(name)))
        .collect();
    files.sort();
    files
}

/// Finds the nearest directory at or above `start` that contains a
/// solution file, searching at most `SOLUTION_SEARCH_DEPTH` parents.
/// The returned path ends with a separator.
pub fn find_solution_dir<P: AsRef<Path>>(start: P) -> BuildResult<Option<PathBuf>> {
    let matcher = marker()?;
    let mut dir = Some(start.as_ref());
    for _ in 0..=SOLUTION_SEARCH_DEPTH {
        let Some(current) = dir else { break };
        if !solution_files(current, &matcher).is_empty() {
            return Ok(Some(with_trailing_separator(current)));
        }
        dir = current.parent();
    }
    Ok(None)
}

/// Variables describing the solution found from `start`:
/// `SolutionDir`, `SolutionFileName` and `SolutionName`.
/// Returns an empty table when no solution is found.
pub fn solution_variables<P: AsRef<Path>>(start: P) -> BuildResult<Variables> {
    let start = start.as_ref();
    let mut variables = Variables::new();
    let Some(solution_dir) = find_solution_dir(start)? else {
        warn!("No solution file found above {}", start.display());
        return Ok(variables);
    };
    debug!("Solution directory: {}", solution_dir.display());
    variables.insert("SolutionDir", solution_dir.to_string_lossy());

    if let Some(file) = solution_files(&solution_dir, &marker()?).first() {
        if let Some(name) = file.file_name() {
            variables.insert("SolutionFileName", name.to_string_lossy());
        }
        if let Some(stem) = file.file_stem() {
            variables.insert("SolutionName", stem.to_string_lossy());
        }
    }
    Ok(variables)
}
