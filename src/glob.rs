//! Filesystem glob expansion rooted at the project directory.
//!
//! Patterns support `*`, `?`, `[...]`, `{a,b}` and recursive `**`. `*` never
//! crosses a separator and does not match names starting with `.` unless the
//! pattern spells the dot. Results keep the shape of the pattern: a relative
//! pattern yields root-relative paths, an absolute one yields absolute paths.
//! A pattern that matches nothing yields an empty list.

use crate::error::{BuildError, BuildResult};
use crate::paths::{path_ends_with_separator, with_trailing_separator};
use globset::{GlobBuilder, GlobMatcher};
use log::debug;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

const META_CHARS: [char; 4] = ['*', '?', '[', '{'];

fn has_meta(component: &str) -> bool {
    component.contains(META_CHARS)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Pattern split into a literal directory prefix and a glob over the rest.
struct SplitPattern {
    base: PathBuf,
    rest: Vec<String>,
}

impl SplitPattern {
    fn new(pattern: &Path) -> Self {
        let mut base = PathBuf::new();
        let mut rest = Vec::new();
        for component in pattern.components() {
            let text = component.as_os_str().to_string_lossy().into_owned();
            if rest.is_empty() && (!matches!(component, Component::Normal(_)) || !has_meta(&text)) {
                base.push(component);
            } else {
                rest.push(text);
            }
        }
        Self { base, rest }
    }

    fn is_recursive(&self) -> bool {
        self.rest.iter().any(|part| part.contains("**"))
    }

    fn matches_hidden(&self) -> bool {
        self.rest.iter().any(|part| part.starts_with('.'))
    }

    fn matcher(&self) -> BuildResult<GlobMatcher> {
        let glob = self.rest.join("/");
        GlobBuilder::new(&glob)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map(|g| g.compile_matcher())
            .map_err(|e| BuildError::GlobError(format!("invalid pattern '{}': {}", glob, e)))
    }
}

/// Expands `pattern` against the filesystem under `root`.
/// A pattern with a trailing separator only matches directories, which are
/// then returned with a trailing separator.
///
/// # Errors
/// * `BuildError::GlobError` if the pattern cannot be compiled
pub fn glob<R: AsRef<Path>, P: AsRef<Path>>(root: R, pattern: P) -> BuildResult<Vec<PathBuf>> {
    let root = root.as_ref();
    let pattern = pattern.as_ref();
    let dirs_only = path_ends_with_separator(pattern);
    let split = SplitPattern::new(pattern);

    if split.rest.is_empty() {
        let target = root.join(pattern);
        let found = if dirs_only { target.is_dir() } else { target.exists() };
        debug!("Literal pattern {} exists: {}", pattern.display(), found);
        return Ok(if found { vec![pattern.to_path_buf()] } else { Vec::new() });
    }

    let matcher = split.matcher()?;
    let walk_base = root.join(&split.base);
    if !walk_base.is_dir() {
        debug!("Glob base {} is not a directory", walk_base.display());
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(&walk_base).min_depth(1).sort_by_file_name();
    if !split.is_recursive() {
        walker = walker.max_depth(split.rest.len());
    }
    let skip_hidden = !split.matches_hidden();

    let mut matches = Vec::new();
    for entry in walker
        .into_iter()
        .filter_entry(|entry| !(skip_hidden && is_hidden(entry)))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if dirs_only && !entry.file_type().is_dir() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&walk_base) else {
            continue;
        };
        if !matcher.is_match(relative_glob_path(relative)) {
            continue;
        }
        let found = split.base.join(relative);
        matches.push(if dirs_only { with_trailing_separator(found) } else { found });
    }
    debug!("Pattern {} matched {} path(s)", pattern.display(), matches.len());
    Ok(matches)
}

/// Every file below `dir`, in sorted walk order, expressed in the same shape
/// as `dir` (root-relative or absolute). Directories themselves are omitted.
pub fn descendant_files<R: AsRef<Path>, P: AsRef<Path>>(root: R, dir: P) -> Vec<PathBuf> {
    walk_descendants(root.as_ref(), dir.as_ref(), |entry| !entry.file_type().is_dir())
}

/// Every file and directory below `dir`, in sorted walk order.
pub fn descendants<R: AsRef<Path>, P: AsRef<Path>>(root: R, dir: P) -> Vec<PathBuf> {
    walk_descendants(root.as_ref(), dir.as_ref(), |_| true)
}

fn walk_descendants(root: &Path, dir: &Path, keep: impl Fn(&DirEntry) -> bool) -> Vec<PathBuf> {
    let walk_base = root.join(dir);
    WalkDir::new(&walk_base)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
        .filter_map(|entry| entry.ok())
        .filter(|entry| keep(entry))
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(&walk_base)
                .ok()
                .map(|relative| dir.join(relative))
        })
        .collect()
}

/// `/`-joined form of a relative path, used for matching.
fn relative_glob_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
