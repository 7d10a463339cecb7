//! Command-line interface implementation for buildtools.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::{DEFAULT_CONFIG_FILE, DEFAULT_CONFIGURATION_NAME};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments structure for buildtools.
#[derive(Parser, Debug)]
#[command(author, version, about = "Build helpers: regex replacement, packaging and post-build events", long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long = "file", value_name = "CONFIG", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config: PathBuf,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Regex replacement utility
    Replace,

    /// Archive utility
    Package,

    /// Post build utility
    Postbuild {
        /// Name of the configuration
        #[arg(short = 'c', long = "configuration", default_value = DEFAULT_CONFIGURATION_NAME)]
        configuration: String,

        /// Target path
        #[arg(short = 't', long = "target")]
        target: PathBuf,
    },
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if no command is given
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingSubcommand
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let _ = Args::command().print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
