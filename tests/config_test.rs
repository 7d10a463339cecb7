use buildtools::config::{load_config, parse_config, Compression};
use buildtools::error::BuildError;
use buildtools::solution::{find_solution_dir, solution_variables};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PROPS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Project ToolsVersion="4.0" xmlns="http://schemas.microsoft.com/developer/msbuild/2003">
  <PropertyGroup>
    <KSPDir>$(SolutionDir)KSP</KSPDir>
    <GameData>$(KSPDir)/GameData</GameData>
  </PropertyGroup>
</Project>
"#;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_parse_config_sections() {
    let config = parse_config(
        r#"{
            "variables": {"Name": "Mod", "Rev": 3},
            "replace": {"**/*.cs": {"a": "b", "c": "d"}},
            "package": {
                "filename": "$(Name).zip",
                "compression": "stored",
                "dependencies": {"dep": {"destination": "GameData/"}}
            }
        }"#,
    )
    .unwrap();

    let replace = config.replace.unwrap();
    let rules = &replace["**/*.cs"];
    let patterns: Vec<&str> = rules.keys().map(String::as_str).collect();
    assert_eq!(patterns, vec!["a", "c"]);

    let package = config.package.unwrap();
    assert_eq!(package.compression, Compression::Stored);
    assert!(package.include.is_empty());
    assert_eq!(package.dependencies["dep"].destination, "GameData/");
    assert!(config.post_build.is_none());
}

#[test]
fn test_default_compression_is_deflated() {
    let config = parse_config(r#"{"package": {"filename": "x"}}"#).unwrap();
    assert_eq!(config.package.unwrap().compression, Compression::Deflated);

    let config = parse_config(r#"{"package": {"filename": "x", "compression": "DEFLATED"}}"#);
    assert_eq!(config.unwrap().package.unwrap().compression, Compression::Deflated);

    let config = parse_config(r#"{"package": {"filename": "x", "compression": "BZIP2"}}"#);
    assert_eq!(config.unwrap().package.unwrap().compression, Compression::Bzip2);
}

#[test]
fn test_invalid_config() {
    assert!(matches!(parse_config("{"), Err(BuildError::ConfigError(_))));
    assert!(matches!(
        parse_config(r#"{"package": {"filename": "x", "compression": "lzma"}}"#),
        Err(BuildError::ConfigError(_))
    ));
    assert!(matches!(
        parse_config(r#"{"package": {"dependencies": {"d": {}}, "filename": "x"}}"#),
        Err(BuildError::ConfigError(_))
    ));
}

#[test]
fn test_find_solution_dir_walks_up() {
    let temp_dir = TempDir::new().unwrap();
    write(&temp_dir.path().join("Mod.sln"), "");
    let nested = temp_dir.path().join("src").join("Mod");
    fs::create_dir_all(&nested).unwrap();

    let found = find_solution_dir(&nested).unwrap().unwrap();
    assert_eq!(found, temp_dir.path());
    assert!(found.to_string_lossy().ends_with(std::path::MAIN_SEPARATOR));

    let vars = solution_variables(&nested).unwrap();
    assert_eq!(vars.get("SolutionFileName"), Some("Mod.sln"));
    assert_eq!(vars.get("SolutionName"), Some("Mod"));
}

#[test]
fn test_load_config_resolves_root_and_variables() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(&root.join("Mod.sln"), "");
    write(&root.join("Build.props"), PROPS);
    write(
        &root.join("buildtools").join("config.json"),
        r#"{
            "root": "..",
            "build_props": "Build.props",
            "variables": {
                "Plugins": "$(GameData)/$(Name)/Plugins",
                "Name": "Mod",
                "KSPDir": "overridden by props"
            }
        }"#,
    );

    let (config, ctx) = load_config(root.join("buildtools").join("config.json")).unwrap();
    assert_eq!(ctx.root(), root);
    assert_eq!(config.build_props.as_deref(), Some("Build.props"));

    let solution_dir = ctx.variables().get("SolutionDir").unwrap().to_string();
    let vars = ctx.variables();
    assert_eq!(vars.get("KSPDir"), Some(format!("{}KSP", solution_dir).as_str()));
    assert_eq!(
        vars.get("Plugins"),
        Some(format!("{}KSP/GameData/Mod/Plugins", solution_dir).as_str())
    );
    let names: Vec<&str> = vars.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec!["Plugins", "Name", "KSPDir", "SolutionDir", "SolutionFileName", "SolutionName", "GameData"]
    );
}

#[test]
fn test_load_config_without_solution() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    write(&path, r#"{"variables": {"A": "$(SolutionDir)x"}}"#);

    let (_config, ctx) = load_config(&path).unwrap();
    assert_eq!(ctx.root(), temp_dir.path());
    // SolutionDir depends on what lies above the temp dir.
    assert!(ctx.variables().get("A").unwrap().ends_with('x'));
}

#[test]
fn test_load_missing_config() {
    let temp_dir = TempDir::new().unwrap();
    let result = load_config(temp_dir.path().join("missing.json"));
    assert!(matches!(result, Err(BuildError::ConfigError(_))));
}
