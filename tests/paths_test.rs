use buildtools::paths::{path_ends_with_separator, Context};
use buildtools::variables::Variables;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn context(root: &TempDir, vars: &[(&str, &str)]) -> Context {
    Context::new(root.path(), vars.iter().copied().collect::<Variables>())
}

#[test]
fn test_trailing_separator_kept() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, &[]);
    let path = ctx.resolve_path("foo/").unwrap();
    assert!(path_ends_with_separator(&path));
    assert_eq!(path, PathBuf::from("foo"));
}

#[test]
fn test_existing_directory_gets_separator() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("out").join("bin")).unwrap();
    let ctx = context(&temp_dir, &[]);

    let path = ctx.resolve_path("out/bin").unwrap();
    assert!(path_ends_with_separator(&path));

    let path = ctx.resolve_path("out/missing").unwrap();
    assert!(!path_ends_with_separator(&path));
}

#[test]
fn test_variables_and_normalization() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, &[("Out", "build/./out//"), ("Name", "Mod")]);

    let path = ctx.resolve_path("$(Out)../$(Name).dll").unwrap();
    assert_eq!(path, PathBuf::from("build/Mod.dll"));

    let path = ctx.resolve_path("$(Out)").unwrap();
    assert!(path_ends_with_separator(&path));
    assert_eq!(path, PathBuf::from("build/out"));
}

#[test]
fn test_empty_resolves_to_root_directory() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = context(&temp_dir, &[]);
    let path = ctx.resolve_path("").unwrap();
    assert!(path_ends_with_separator(&path));
    assert_eq!(ctx.absolute(&path), temp_dir.path().join("."));
}

#[test]
fn test_absolute_paths_ignore_root() {
    let temp_dir = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    let ctx = context(&temp_dir, &[]);
    assert_eq!(ctx.absolute(other.path()), other.path());
    assert!(ctx.is_dir(other.path()));
}
