//! Post-build step: converter call, cleanup and installation of build
//! outputs, driven by the `post_build` section.

use crate::config::{PostBuildConfig, PostBuildEvents};
use crate::error::{BuildError, BuildResult};
use crate::fs::{copy_dir_all, copy_file, remove_path};
use crate::glob::glob;
use crate::paths::{normalize, with_trailing_separator, Context};
use crate::variables::Variables;
use indexmap::IndexMap;
use log::{info, warn};
use std::path::Path;
use std::process::Command;

/// `Target*` variables describing the build output at `target`. A relative
/// target is taken relative to the project root.
pub fn target_variables<P: AsRef<Path>>(ctx: &Context, target: P) -> Variables {
    let target_path = normalize(ctx.absolute(target));
    let file_name = target_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = target_path
        .parent()
        .map(with_trailing_separator)
        .unwrap_or_default();
    let name = target_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = target_path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let mut variables = Variables::new();
    variables.insert("TargetPath", target_path.to_string_lossy());
    variables.insert("TargetFileName", file_name);
    variables.insert("TargetDir", dir.to_string_lossy());
    variables.insert("TargetName", name);
    variables.insert("TargetExt", ext);
    variables
}

/// Adds the configuration and target variables to `ctx` and returns the
/// events after applying the `[configuration]` and `[target name]` overrides.
pub fn prepare(
    ctx: &mut Context,
    config: &PostBuildConfig,
    configuration: &str,
    target: &Path,
) -> BuildResult<PostBuildEvents> {
    let target_vars = target_variables(ctx, target);
    ctx.variables_mut().insert("ConfigurationName", configuration);
    ctx.variables_mut().merge(target_vars);

    let mut events = config.events.clone();
    if let Some(section) = config.override_for(configuration) {
        events.overlay(section);
    }
    let target_name = ctx.variables().get("TargetName").unwrap_or_default().to_string();
    if let Some(section) = config.override_for(&target_name) {
        events.overlay(section);
    }
    Ok(events)
}

/// Runs `converter` with `target` as its only argument.
pub fn pdb2mdb(converter: &Path, target: &str) -> BuildResult<()> {
    info!("Calling '{} {}'", converter.display(), target);
    let status = Command::new(converter)
        .arg(target)
        .status()
        .map_err(BuildError::IoError)?;
    if !status.success() {
        warn!("'{}' exited with {}", converter.display(), status);
    }
    Ok(())
}

/// Removes every listed path that exists.
pub fn clean(ctx: &Context, paths: &[String]) -> BuildResult<()> {
    for path in paths {
        let path = ctx.absolute(ctx.resolve_path(path)?);
        remove_path(&path)?;
    }
    Ok(())
}

/// Copies every match of each source pattern to its destination.
/// Directories are copied as whole trees; files are copied into a
/// directory-shaped destination under their own name.
pub fn install(ctx: &Context, mapping: &IndexMap<String, String>) -> BuildResult<()> {
    for (source, dest) in mapping {
        let source = ctx.resolve_path(source)?;
        let dest = ctx.resolve_path(dest)?;
        let dest_abs = ctx.absolute(&dest);

        for path in glob(ctx.root(), &source)? {
            let path_abs = ctx.absolute(&path);
            if path_abs.is_dir() {
                info!("Copying tree '{}' -> '{}'", path.display(), dest.display());
                copy_dir_all(&path_abs, &dest_abs)?;
            } else {
                let target = match path.file_name() {
                    Some(name) if ctx.is_dir_like(&dest) => dest_abs.join(name),
                    _ => dest_abs.clone(),
                };
                info!("Copying file '{}' -> '{}'", path.display(), dest.display());
                copy_file(&path_abs, &target)?;
            }
        }
    }
    Ok(())
}

/// Runs the post-build events for `configuration` and `target`.
pub fn post_build(
    ctx: &mut Context,
    config: &PostBuildConfig,
    configuration: &str,
    target: &Path,
) -> BuildResult<()> {
    let events = prepare(ctx, config, configuration, target)?;

    if let Some(converter) = &events.pdb2mdb {
        let converter = ctx.resolve_path(converter)?;
        // Bare program names are left to the PATH lookup.
        let converter = match ctx.absolute(&converter) {
            local if local.exists() => local,
            _ => converter,
        };
        let target_path = ctx.variables().get("TargetPath").unwrap_or_default().to_string();
        pdb2mdb(&converter, &target_path)?;
    }
    if let Some(paths) = &events.clean {
        clean(ctx, paths)?;
    }
    if let Some(mapping) = &events.install {
        install(ctx, mapping)?;
    }
    Ok(())
}
