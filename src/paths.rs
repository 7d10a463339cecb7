//! Path resolution relative to an explicit project root.
//!
//! A resolved path keeps a trailing separator when it denotes a directory.
//! Downstream code relies on that shape: a destination ending in a separator
//! means "under this directory, keeping the source's file name".

use crate::error::BuildResult;
use crate::variables::Variables;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Returns true if `value` ends with `/` or `\`.
pub fn ends_with_separator<S: AsRef<str>>(value: S) -> bool {
    value.as_ref().ends_with(['/', '\\'])
}

/// Returns true if the textual form of `path` ends with a separator.
pub fn path_ends_with_separator<P: AsRef<Path>>(path: P) -> bool {
    ends_with_separator(path.as_ref().to_string_lossy())
}

/// Appends a trailing separator unless `path` already has one.
pub fn with_trailing_separator<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if path_ends_with_separator(path) {
        return path.to_path_buf();
    }
    let mut raw = OsString::from(path.as_os_str());
    raw.push(MAIN_SEPARATOR.to_string());
    PathBuf::from(raw)
}

/// Lexically normalizes `path`: drops `.` segments and repeated separators and
/// folds `name/..` pairs. Leading `..` segments of a relative path are kept,
/// `..` directly under a root is dropped. An empty result becomes `.`.
pub fn normalize<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Resolution context shared by every command: the project root and the
/// loaded variable table. Relative paths are interpreted against `root`.
#[derive(Debug, Clone)]
pub struct Context {
    root: PathBuf,
    variables: Variables,
}

impl Context {
    pub fn new<P: Into<PathBuf>>(root: P, variables: Variables) -> Self {
        Self {
            root: root.into(),
            variables,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    /// Expands placeholders in `value`.
    pub fn resolve(&self, value: &str) -> BuildResult<String> {
        self.variables.resolve(value)
    }

    /// Expands placeholders in `raw` and normalizes the result as a path.
    /// A trailing separator is added when `raw` or its expansion ends with
    /// one, or when the result names an existing directory under the root.
    pub fn resolve_path(&self, raw: &str) -> BuildResult<PathBuf> {
        let resolved = self.resolve(raw)?;
        let path = normalize(&resolved);
        if ends_with_separator(raw) || ends_with_separator(&resolved) || self.is_dir(&path) {
            return Ok(with_trailing_separator(path));
        }
        Ok(path)
    }

    /// `path` anchored at the root. Absolute paths are returned unchanged.
    pub fn absolute<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.root.join(path)
    }

    /// Returns true if `path` is an existing directory under the root.
    pub fn is_dir<P: AsRef<Path>>(&self, path: P) -> bool {
        self.absolute(path).is_dir()
    }

    /// Returns true if `path` ends with a separator or is an existing
    /// directory under the root.
    pub fn is_dir_like<P: AsRef<Path>>(&self, path: P) -> bool {
        path_ends_with_separator(&path) || self.is_dir(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a/./b//c"), PathBuf::from("a/b/c"));
        assert_eq!(normalize("a/b/../c"), PathBuf::from("a/c"));
        assert_eq!(normalize("../a"), PathBuf::from("../a"));
        assert_eq!(normalize("a/.."), PathBuf::from("."));
        assert_eq!(normalize(""), PathBuf::from("."));
        assert_eq!(normalize("/../etc"), PathBuf::from("/etc"));
    }

    #[test]
    fn test_with_trailing_separator() {
        let path = with_trailing_separator("out");
        assert!(path_ends_with_separator(&path));
        assert_eq!(with_trailing_separator(&path), path);
    }
}
