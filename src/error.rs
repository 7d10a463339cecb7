//! Error handling for buildtools.
//! Defines the error type and result alias shared by every command.

use std::io;
use thiserror::Error;

/// Errors raised while loading configuration or running a command.
///
/// Lookup misses (unknown variables, globs matching nothing, capture groups
/// that did not participate) are not errors and never reach this type.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// Represents errors in the configuration file or a missing section
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents a replacement pattern that is not a valid regex
    #[error("Pattern error: {0}.")]
    PatternError(String),

    /// Represents a glob pattern that cannot be compiled or walked
    #[error("Glob error: {0}.")]
    GlobError(String),

    /// Represents a variable whose expansion never settles
    #[error("Variable cycle: {0}.")]
    VariableCycle(String),

    /// Represents errors while writing the package archive
    #[error("Archive error: {0}.")]
    ArchiveError(String),

    /// Represents errors raised by post-build events
    #[error("Post-build error: {0}.")]
    PostBuildError(String),
}

/// Convenience type alias for Results with BuildError as the error type.
pub type BuildResult<T> = Result<T, BuildError>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The BuildError to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with status code 1
pub fn default_error_handler(err: BuildError) {
    eprintln!("{}", err);
    std::process::exit(1);
}
