//! buildtools is a small build-automation helper.
//! It resolves `$(NAME)` variables, rewrites files with regex rules and
//! packages files described by include, exclude and map rules.

/// Archive writing for the package command
pub mod archive;

/// Command-line interface module
pub mod cli;

/// JSON configuration loading and root resolution
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling
pub mod error;

/// Whole-file read, atomic write and copy helpers
pub mod fs;

/// Filesystem glob expansion relative to the project root
pub mod glob;

/// Logger initialisation
pub mod logger;

/// Source → destination manifest built from packaging rules
pub mod manifest;

/// Path normalization and the resolution context
pub mod paths;

/// Post-build events: converter call, clean and install
pub mod postbuild;

/// MSBuild-style properties file loading
pub mod props;

/// Solution directory discovery
pub mod solution;

/// Regex substitution with group splicing and backreferences
pub mod substitute;

/// `$(NAME)` variable table
pub mod variables;
