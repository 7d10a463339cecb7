//! Common constants used throughout buildtools.

/// Configuration file read when `--file` is not given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Glob identifying the directory that seeds the `Solution*` variables
pub const SOLUTION_MARKER: &str = "*.sln";

/// Number of parent directories searched for a solution file
pub const SOLUTION_SEARCH_DEPTH: usize = 20;

/// Upper bound on whole-string substitution passes for one value
pub const MAX_RESOLVE_PASSES: usize = 64;

/// Configuration name used when `postbuild` is called without `--configuration`
pub const DEFAULT_CONFIGURATION_NAME: &str = "__NoName__";
