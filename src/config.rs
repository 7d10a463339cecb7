//! Configuration handling for buildtools.
//! Loads the JSON configuration, resolves the project root and builds the
//! variable table every command resolves against.

use crate::error::{BuildError, BuildResult};
use crate::paths::Context;
use crate::props::load_build_props;
use crate::solution::solution_variables;
use crate::substitute::RuleGroup;
use crate::variables::Variables;
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Top-level configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Project root, relative to the configuration file's directory
    #[serde(default)]
    pub root: Option<String>,

    /// Properties file, relative to the project root
    #[serde(default)]
    pub build_props: Option<String>,

    #[serde(default)]
    pub variables: IndexMap<String, serde_json::Value>,

    /// Glob → ordered (pattern → replacement) rules
    #[serde(default)]
    pub replace: Option<IndexMap<String, RuleGroup>>,

    #[serde(default)]
    pub package: Option<PackageConfig>,

    #[serde(default)]
    pub post_build: Option<PostBuildConfig>,
}

/// Compression method of the zip members written by `package`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    #[serde(alias = "DEFLATED", alias = "Deflated")]
    Deflated,
    #[serde(alias = "STORED", alias = "Stored")]
    Stored,
    #[serde(alias = "BZIP2", alias = "Bzip2")]
    Bzip2,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageConfig {
    pub filename: String,
    #[serde(default)]
    pub output_dir: String,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub map: IndexMap<String, String>,
    /// Dependency directory → its own rules
    #[serde(default)]
    pub dependencies: IndexMap<String, Dependency>,
}

/// Packaging rules scoped to an external directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dependency {
    pub destination: String,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub map: IndexMap<String, String>,
}

/// Events run by `postbuild`. Every key is optional so that override
/// sections can replace single events.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostBuildEvents {
    #[serde(default)]
    pub pdb2mdb: Option<String>,
    #[serde(default)]
    pub clean: Option<Vec<String>>,
    #[serde(default)]
    pub install: Option<IndexMap<String, String>>,
}

impl PostBuildEvents {
    /// Replaces the events set in `other`, keeping the rest.
    pub fn overlay(&mut self, other: &PostBuildEvents) {
        if other.pdb2mdb.is_some() {
            self.pdb2mdb = other.pdb2mdb.clone();
        }
        if other.clean.is_some() {
            self.clean = other.clean.clone();
        }
        if other.install.is_some() {
            self.install = other.install.clone();
        }
    }
}

/// The `post_build` section: base events plus `[Name]` override sections
/// keyed by configuration or target name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostBuildConfig {
    #[serde(flatten)]
    pub events: PostBuildEvents,
    #[serde(flatten)]
    pub overrides: IndexMap<String, PostBuildEvents>,
}

impl PostBuildConfig {
    pub fn override_for(&self, name: &str) -> Option<&PostBuildEvents> {
        self.overrides.get(&format!("[{}]", name))
    }
}

/// Parses configuration content.
///
/// # Errors
/// * `BuildError::ConfigError` if the content is not valid JSON for `Config`
pub fn parse_config(content: &str) -> BuildResult<Config> {
    serde_json::from_str(content)
        .map_err(|e| BuildError::ConfigError(format!("Invalid configuration format: {}", e)))
}

/// Resolves the project root of a configuration stored at `config_path`.
pub fn resolve_root(config: &Config, config_path: &Path) -> BuildResult<PathBuf> {
    let config_dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let config_dir = std::path::absolute(&config_dir).map_err(BuildError::IoError)?;
    let root = match &config.root {
        Some(root) => config_dir.join(root),
        None => config_dir,
    };
    Ok(crate::paths::normalize(root))
}

/// Builds the variable table for `config` rooted at `root`.
///
/// The configuration's own variables come first. Solution and properties
/// variables are resolved among themselves, then merged over them, and the
/// merged table is resolved once more in order.
pub fn load_variables(config: &Config, root: &Path) -> BuildResult<Variables> {
    let mut seed = solution_variables(root)?;
    if let Some(props) = &config.build_props {
        seed.merge(load_build_props(root.join(props))?);
    }
    seed.resolve_in_place()?;

    let mut variables = Variables::from(&config.variables);
    variables.merge(seed);
    variables.resolve_in_place()?;
    debug!("Loaded {} variable(s)", variables.len());
    Ok(variables)
}

/// Reads the configuration file and returns it with its resolution context.
///
/// # Errors
/// * `BuildError::IoError` if the file cannot be read
/// * `BuildError::ConfigError` if it cannot be parsed
pub fn load_config<P: AsRef<Path>>(config_path: P) -> BuildResult<(Config, Context)> {
    let config_path = config_path.as_ref();
    debug!("Loading configuration from {}", config_path.display());
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        BuildError::ConfigError(format!("cannot read '{}': {}", config_path.display(), e))
    })?;
    let config = parse_config(&content)?;
    let root = resolve_root(&config, config_path)?;
    debug!("Project root: {}", root.display());
    let variables = load_variables(&config, &root)?;
    Ok((config, Context::new(root, variables)))
}
