//! Variable table with `$(NAME)` placeholder resolution.
//!
//! Resolution of a single string is iterated until a pass performs no
//! replacement, so placeholders produced by an expansion are expanded too.
//! Loading a table is a single ordered pass: every entry is resolved against
//! the table as already rewritten by the entries before it.

use crate::constants::MAX_RESOLVE_PASSES;
use crate::error::{BuildError, BuildResult};
use indexmap::IndexMap;
use log::debug;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\(([\w\-]+)\)").expect("placeholder regex is valid"));

/// Ordered mapping of variable names to string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    values: IndexMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Inserts or overwrites a raw value. An existing name keeps its position.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.values.insert(name.into(), value.into());
    }

    /// Overlays `other` onto this table; values from `other` win.
    pub fn merge(&mut self, other: Variables) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expands every `$(NAME)` in `value`. Unknown names expand to nothing.
    ///
    /// A reference cycle that keeps producing placeholders is an error rather
    /// than a silently truncated expansion.
    ///
    /// # Errors
    /// * `BuildError::VariableCycle` if placeholders are still present after
    ///   `MAX_RESOLVE_PASSES` passes, e.g. for `A = "x$(A)"`
    pub fn resolve(&self, value: &str) -> BuildResult<String> {
        let mut current = value.to_string();
        for _ in 0..MAX_RESOLVE_PASSES {
            if !PLACEHOLDER.is_match(&current) {
                return Ok(current);
            }
            current = PLACEHOLDER
                .replace_all(&current, |caps: &Captures| {
                    self.get(&caps[1]).unwrap_or_default().to_string()
                })
                .into_owned();
        }
        if PLACEHOLDER.is_match(&current) {
            return Err(BuildError::VariableCycle(format!(
                "'{}' still contains placeholders after {} passes",
                value, MAX_RESOLVE_PASSES
            )));
        }
        Ok(current)
    }

    /// Resolves every entry once, in insertion order, storing each result
    /// before the next entry is visited.
    pub fn resolve_in_place(&mut self) -> BuildResult<()> {
        for index in 0..self.values.len() {
            let Some((name, raw)) = self.values.get_index(index) else {
                continue;
            };
            let resolved = self.resolve(raw)?;
            debug!("Variable {} = '{}'", name, resolved);
            if let Some((_, value)) = self.values.get_index_mut(index) {
                *value = resolved;
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut variables = Variables::new();
        for (name, value) in iter {
            variables.insert(name, value);
        }
        variables
    }
}

impl From<&IndexMap<String, serde_json::Value>> for Variables {
    /// Strings are taken verbatim, `null` becomes empty and any other JSON
    /// value is stored as its JSON text.
    fn from(raw: &IndexMap<String, serde_json::Value>) -> Self {
        raw.iter()
            .map(|(name, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect()
    }
}
