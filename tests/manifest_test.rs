use buildtools::config::{Dependency, PackageConfig};
use buildtools::manifest::{build_manifest, ManifestBuilder};
use buildtools::paths::Context;
use buildtools::variables::Variables;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn touch(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, relative).unwrap();
}

fn pairs(manifest: &buildtools::manifest::Manifest) -> Vec<(PathBuf, PathBuf)> {
    manifest
        .iter()
        .map(|(src, dst)| (src.to_path_buf(), dst.to_path_buf()))
        .collect()
}

fn pair(src: &str, dst: &str) -> (PathBuf, PathBuf) {
    (PathBuf::from(src), PathBuf::from(dst))
}

#[test]
fn test_include_exclude_map_order() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), "a.txt");
    touch(temp_dir.path(), "secret.txt");
    let ctx = Context::new(temp_dir.path(), Variables::new());

    let package = PackageConfig {
        filename: "out.zip".to_string(),
        include: vec!["*.txt".to_string()],
        exclude: vec!["secret.txt".to_string()],
        map: [("secret.txt".to_string(), "out/keep.txt".to_string())]
            .into_iter()
            .collect(),
        ..Default::default()
    };
    let manifest = build_manifest(&ctx, &package).unwrap();

    assert_eq!(
        pairs(&manifest),
        vec![pair("a.txt", "a.txt"), pair("secret.txt", "out/keep.txt")]
    );
}

#[test]
fn test_directory_include_expands_to_files() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), "data/one.cfg");
    touch(temp_dir.path(), "data/sub/two.cfg");
    fs::create_dir_all(temp_dir.path().join("data").join("empty")).unwrap();
    let ctx = Context::new(temp_dir.path(), Variables::new());

    let mut builder = ManifestBuilder::new(&ctx);
    builder.include("data", None).unwrap();
    let manifest = builder.finish();

    assert!(!manifest.contains_source("data"));
    assert!(!manifest.contains_source("data/empty"));
    assert_eq!(
        pairs(&manifest),
        vec![
            pair("data/one.cfg", "data/one.cfg"),
            pair("data/sub/two.cfg", "data/sub/two.cfg"),
        ]
    );
}

#[test]
fn test_directory_include_with_directory_destination_uses_base_names() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), "bin/Mod.dll");
    touch(temp_dir.path(), "bin/lib/Dep.dll");
    let ctx = Context::new(temp_dir.path(), Variables::new());

    let mut builder = ManifestBuilder::new(&ctx);
    builder.map("bin", "GameData/Mod/Plugins/").unwrap();
    let manifest = builder.finish();

    assert_eq!(
        pairs(&manifest),
        vec![
            pair("bin/Mod.dll", "GameData/Mod/Plugins/Mod.dll"),
            pair("bin/lib/Dep.dll", "GameData/Mod/Plugins/Dep.dll"),
        ]
    );
}

#[test]
fn test_include_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), "a.txt");
    let ctx = Context::new(temp_dir.path(), Variables::new());

    let mut builder = ManifestBuilder::new(&ctx);
    builder.include("a.txt", None).unwrap();
    builder.include("*.txt", None).unwrap();
    builder.map("a.txt", "docs/").unwrap();
    builder.map("a.txt", "docs/").unwrap();
    let manifest = builder.finish();

    assert_eq!(manifest.len(), 1);
    let destinations = manifest.get("a.txt").unwrap();
    assert_eq!(destinations.len(), 2);
    assert!(destinations.contains(Path::new("a.txt")));
    assert!(destinations.contains(Path::new("docs/a.txt")));
}

#[test]
fn test_exclude_directory_removes_descendants() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), "keep.txt");
    touch(temp_dir.path(), "obj/a.o");
    touch(temp_dir.path(), "obj/deep/b.o");
    let ctx = Context::new(temp_dir.path(), Variables::new());

    let mut builder = ManifestBuilder::new(&ctx);
    builder.include("**/*", None).unwrap();
    builder.exclude("obj").unwrap();
    builder.exclude("never-included.txt").unwrap();
    let manifest = builder.finish();

    let sources: Vec<&Path> = manifest.sources().collect();
    assert_eq!(sources, vec![Path::new("keep.txt")]);
}

#[test]
fn test_non_matching_glob_is_noop() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = Context::new(temp_dir.path(), Variables::new());

    let mut builder = ManifestBuilder::new(&ctx);
    builder.include("missing/**/*.dll", None).unwrap();
    builder.exclude("*.nothing").unwrap();
    builder.map("nope.txt", "out/").unwrap();
    assert!(builder.manifest().is_empty());
}

#[test]
fn test_patterns_and_destinations_resolve_variables() {
    let temp_dir = TempDir::new().unwrap();
    touch(temp_dir.path(), "bin/Release/Mod.dll");
    let vars: Variables = [("Config", "Release"), ("Name", "Mod")].into_iter().collect();
    let ctx = Context::new(temp_dir.path(), vars);

    let mut builder = ManifestBuilder::new(&ctx);
    builder.map("bin/$(Config)/$(Name).dll", "GameData/$(Name)/").unwrap();
    let manifest = builder.finish();

    assert_eq!(
        pairs(&manifest),
        vec![pair("bin/Release/Mod.dll", "GameData/Mod/Mod.dll")]
    );
}

#[test]
fn test_dependencies_run_after_top_level_rules() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(root, "Mod.dll");
    touch(root, "deps/Graph/Graph.dll");
    touch(root, "deps/Graph/Graph.pdb");
    touch(root, "deps/Graph/LICENSE");
    let ctx = Context::new(root, Variables::new());

    let dependency = Dependency {
        destination: "GameData/Graph/".to_string(),
        include: vec!["*.dll".to_string(), "*.pdb".to_string()],
        exclude: vec!["*.pdb".to_string()],
        map: [("LICENSE".to_string(), "GameData/Graph/LICENSE.txt".to_string())]
            .into_iter()
            .collect(),
    };
    let package = PackageConfig {
        filename: "out.zip".to_string(),
        include: vec!["*.dll".to_string()],
        // Top-level excludes never see dependency entries.
        exclude: vec!["deps/**/*.dll".to_string()],
        dependencies: [("deps/Graph".to_string(), dependency)].into_iter().collect(),
        ..Default::default()
    };
    let manifest = build_manifest(&ctx, &package).unwrap();

    assert_eq!(
        pairs(&manifest),
        vec![
            pair("Mod.dll", "Mod.dll"),
            pair("deps/Graph/Graph.dll", "GameData/Graph/Graph.dll"),
            pair("deps/Graph/LICENSE", "GameData/Graph/LICENSE.txt"),
        ]
    );
}

#[test]
fn test_dependency_map_absolute_source() {
    let temp_dir = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    touch(outside.path(), "extra.cfg");
    fs::create_dir_all(temp_dir.path().join("dep")).unwrap();
    let ctx = Context::new(temp_dir.path(), Variables::new());

    let source = outside.path().join("extra.cfg");
    let dependency = Dependency {
        destination: "GameData/".to_string(),
        map: [(source.to_string_lossy().into_owned(), "cfg/".to_string())]
            .into_iter()
            .collect(),
        ..Default::default()
    };
    let mut builder = ManifestBuilder::new(&ctx);
    builder.dependency("dep", &dependency).unwrap();
    let manifest = builder.finish();

    assert_eq!(
        pairs(&manifest),
        vec![(source, PathBuf::from("cfg/extra.cfg"))]
    );
}
