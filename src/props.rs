//! Loader for MSBuild-style properties files.
//! Only the first element under the document root is read, normally a
//! `<PropertyGroup>`. Each of its direct child elements that carries text
//! becomes a variable named after the element's local name.

use crate::error::{BuildError, BuildResult};
use crate::variables::Variables;
use log::debug;
use roxmltree::Document;
use std::path::Path;

/// Reads the properties file at `path`.
///
/// # Errors
/// * `BuildError::IoError` if the file cannot be read
/// * `BuildError::ConfigError` if it is not well-formed XML
pub fn load_build_props<P: AsRef<Path>>(path: P) -> BuildResult<Variables> {
    let path = path.as_ref();
    debug!("Loading build properties from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(BuildError::IoError)?;
    parse_build_props(&content)
        .map_err(|e| BuildError::ConfigError(format!("{}: {}", path.display(), e)))
}

/// Extracts the properties of the root's first child element in `content`.
pub fn parse_build_props(content: &str) -> BuildResult<Variables> {
    let document =
        Document::parse(content).map_err(|e| BuildError::ConfigError(e.to_string()))?;
    let mut variables = Variables::new();
    let Some(group) = document.root_element().children().find(|node| node.is_element()) else {
        debug!("No property group found");
        return Ok(variables);
    };

    for property in group.children().filter(|node| node.is_element()) {
        if let Some(text) = property.text() {
            variables.insert(property.tag_name().name(), text);
        }
    }
    Ok(variables)
}
