//! buildtools entry point.
//! Parses the command line, loads the configuration and dispatches to the
//! requested command.

use buildtools::{
    archive::package,
    cli::{get_args, Args, Commands},
    config::load_config,
    error::{default_error_handler, BuildError, BuildResult},
    logger::init_logger,
    postbuild::post_build,
    substitute::replace,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn missing_section(name: &str) -> BuildError {
    BuildError::ConfigError(format!("configuration has no '{}' section", name))
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the configuration and its variables
/// 2. Runs the selected command against the project root
fn run(args: Args) -> BuildResult<()> {
    let (config, mut ctx) = load_config(&args.config)?;

    match args.command {
        Commands::Replace => {
            let groups = config.replace.as_ref().ok_or_else(|| missing_section("replace"))?;
            replace(&ctx, groups)
        }
        Commands::Package => {
            let section = config.package.as_ref().ok_or_else(|| missing_section("package"))?;
            package(&ctx, section).map(|_| ())
        }
        Commands::Postbuild {
            configuration,
            target,
        } => {
            let section = config
                .post_build
                .as_ref()
                .ok_or_else(|| missing_section("post_build"))?;
            post_build(&mut ctx, section, &configuration, &target)
        }
    }
}
