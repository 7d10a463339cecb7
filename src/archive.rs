//! Writes the package zip archive from a manifest.

use crate::config::{Compression, PackageConfig};
use crate::error::{BuildError, BuildResult};
use crate::manifest::{build_manifest, Manifest};
use crate::paths::Context;
use log::info;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Component, Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive member name for `dest`: normal components joined with `/`.
/// Roots, drive prefixes, `.` and `..` are dropped.
pub fn member_name<P: AsRef<Path>>(dest: P) -> String {
    dest.as_ref()
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn archive_error<E: std::fmt::Display>(e: E) -> BuildError {
    BuildError::ArchiveError(e.to_string())
}

impl From<Compression> for CompressionMethod {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
            Compression::Bzip2 => CompressionMethod::Bzip2,
        }
    }
}

fn append_entries<W: Write + Seek>(
    ctx: &Context,
    writer: &mut ZipWriter<W>,
    manifest: &Manifest,
    method: CompressionMethod,
) -> BuildResult<()> {
    for (source, dest) in manifest {
        let name = member_name(dest);
        if name.is_empty() {
            return Err(BuildError::ArchiveError(format!(
                "empty archive name for '{}'",
                source.display()
            )));
        }
        info!("Writing '{}' -> '{}'", source.display(), name);
        let mut input = File::open(ctx.absolute(source)).map_err(BuildError::IoError)?;
        let options = SimpleFileOptions::default().compression_method(method);
        writer.start_file(name.as_str(), options).map_err(archive_error)?;
        std::io::copy(&mut input, writer).map_err(archive_error)?;
    }
    Ok(())
}

/// Writes every manifest entry into a zip archive at `archive`.
pub fn write_archive<P: AsRef<Path>>(
    ctx: &Context,
    manifest: &Manifest,
    archive: P,
    compression: Compression,
) -> BuildResult<()> {
    let archive = archive.as_ref();
    if let Some(parent) = archive.parent() {
        std::fs::create_dir_all(parent).map_err(BuildError::IoError)?;
    }
    let file = File::create(archive).map_err(BuildError::IoError)?;

    let mut writer = ZipWriter::new(file);
    append_entries(ctx, &mut writer, manifest, compression.into())?;
    writer.finish().map_err(archive_error)?;
    Ok(())
}

/// Path of the archive described by `package`.
pub fn archive_path(ctx: &Context, package: &PackageConfig) -> BuildResult<PathBuf> {
    let name = ctx.resolve(&package.filename)?;
    let output_dir = ctx.resolve_path(&package.output_dir)?;
    Ok(ctx.absolute(output_dir).join(name))
}

/// Builds the manifest for `package` and writes its archive.
/// Returns the path of the written archive.
pub fn package(ctx: &Context, package: &PackageConfig) -> BuildResult<PathBuf> {
    if package.filename.trim().is_empty() {
        return Err(BuildError::ConfigError(
            "package.filename must not be empty".to_string(),
        ));
    }
    let manifest = build_manifest(ctx, package)?;
    let archive = archive_path(ctx, package)?;
    info!("Packaging '{}'", archive.display());
    write_archive(ctx, &manifest, &archive, package.compression)?;
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_name() {
        assert_eq!(member_name("GameData/FAR/a.dll"), "GameData/FAR/a.dll");
        assert_eq!(member_name("/abs/./x/../y"), "abs/x/y");
        assert_eq!(member_name("out/"), "out");
    }
}
