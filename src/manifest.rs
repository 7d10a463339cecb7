//! Packaging manifest: the mapping from source paths to the set of archive
//! destinations they are written to.
//!
//! Rules run in a fixed order: top-level includes, top-level excludes,
//! top-level maps, then every dependency in declaration order with its own
//! include, exclude and map rules. Maps run after excludes, so an explicit
//! mapping survives an exclude that matches the same source.

use crate::config::{Dependency, PackageConfig};
use crate::error::BuildResult;
use crate::glob::{descendant_files, descendants, glob};
use crate::paths::Context;
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::path::{Path, PathBuf};

/// Source path → destinations, both in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    files: IndexMap<PathBuf, IndexSet<PathBuf>>,
}

impl Manifest {
    /// Number of distinct sources.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get<P: AsRef<Path>>(&self, source: P) -> Option<&IndexSet<PathBuf>> {
        self.files.get(source.as_ref())
    }

    pub fn contains_source<P: AsRef<Path>>(&self, source: P) -> bool {
        self.files.contains_key(source.as_ref())
    }

    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// One `(source, destination)` pair per destination of every source.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.files.iter().flat_map(|(source, destinations)| {
            destinations
                .iter()
                .map(move |dest| (source.as_path(), dest.as_path()))
        })
    }

    fn add(&mut self, source: PathBuf, dest: PathBuf) {
        self.files.entry(source).or_default().insert(dest);
    }

    fn remove(&mut self, source: &Path) -> bool {
        self.files.shift_remove(source).is_some()
    }
}

/// Applies include, exclude and map rules to a manifest.
pub struct ManifestBuilder<'a> {
    ctx: &'a Context,
    manifest: Manifest,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            manifest: Manifest::default(),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn finish(self) -> Manifest {
        self.manifest
    }

    fn expand(&self, pattern: &str) -> BuildResult<Vec<PathBuf>> {
        glob(self.ctx.root(), self.ctx.resolve_path(pattern)?)
    }

    /// Adds `source` with `dest`. Directories contribute each descendant file
    /// with the same `dest`. A directory-shaped `dest` receives the file under
    /// its base name; no `dest` maps the source onto itself.
    pub fn append(&mut self, source: &Path, dest: Option<&Path>) {
        if self.ctx.is_dir_like(source) {
            for file in descendant_files(self.ctx.root(), source) {
                self.append_file(&file, dest);
            }
            return;
        }
        self.append_file(source, dest);
    }

    fn append_file(&mut self, source: &Path, dest: Option<&Path>) {
        let target = match dest {
            None => source.to_path_buf(),
            Some(dest) if self.ctx.is_dir_like(dest) => match source.file_name() {
                Some(name) => dest.join(name),
                None => dest.join(source),
            },
            Some(dest) => dest.to_path_buf(),
        };
        debug!("Manifest {} -> {}", source.display(), target.display());
        self.manifest.add(source.to_path_buf(), target);
    }

    /// Drops `source` and, for a directory, everything below it.
    pub fn remove(&mut self, source: &Path) {
        if self.ctx.is_dir_like(source) {
            for path in descendants(self.ctx.root(), source) {
                self.manifest.remove(&path);
            }
        }
        if self.manifest.remove(source) {
            debug!("Excluded {}", source.display());
        }
    }

    pub fn include(&mut self, pattern: &str, dest: Option<&Path>) -> BuildResult<()> {
        for path in self.expand(pattern)? {
            self.append(&path, dest);
        }
        Ok(())
    }

    pub fn exclude(&mut self, pattern: &str) -> BuildResult<()> {
        for path in self.expand(pattern)? {
            self.remove(&path);
        }
        Ok(())
    }

    /// Includes every match of `source` with destination `dest`, which is
    /// resolved first.
    pub fn map(&mut self, source: &str, dest: &str) -> BuildResult<()> {
        let dest = self.ctx.resolve_path(dest)?;
        for path in self.expand(source)? {
            self.append(&path, Some(dest.as_path()));
        }
        Ok(())
    }

    /// Runs a dependency's rules relative to its directory `name`. Includes
    /// go under the dependency's destination; map sources are relative to
    /// the dependency directory unless absolute.
    pub fn dependency(&mut self, name: &str, dependency: &Dependency) -> BuildResult<()> {
        let source_dir = self.ctx.resolve_path(name)?;
        let dest = self.ctx.resolve_path(&dependency.destination)?;
        debug!(
            "Dependency {} -> {}",
            source_dir.display(),
            dest.display()
        );

        for pattern in &dependency.include {
            self.include(&join_pattern(&source_dir, pattern), Some(dest.as_path()))?;
        }
        for pattern in &dependency.exclude {
            self.exclude(&join_pattern(&source_dir, pattern))?;
        }
        for (source, target) in &dependency.map {
            let source = self.ctx.resolve_path(source)?;
            let source = if source.is_absolute() {
                source
            } else {
                source_dir.join(source)
            };
            self.map(&source.to_string_lossy(), target)?;
        }
        Ok(())
    }
}

fn join_pattern(dir: &Path, pattern: &str) -> String {
    dir.join(pattern).to_string_lossy().into_owned()
}

/// Builds the manifest for a `package` section.
pub fn build_manifest(ctx: &Context, package: &PackageConfig) -> BuildResult<Manifest> {
    let mut builder = ManifestBuilder::new(ctx);

    for pattern in &package.include {
        builder.include(pattern, None)?;
    }
    for pattern in &package.exclude {
        builder.exclude(pattern)?;
    }
    for (source, dest) in &package.map {
        builder.map(source, dest)?;
    }
    for (name, dependency) in &package.dependencies {
        builder.dependency(name, dependency)?;
    }

    Ok(builder.finish())
}

impl<'m> IntoIterator for &'m Manifest {
    type Item = (&'m Path, &'m Path);
    type IntoIter = Box<dyn Iterator<Item = (&'m Path, &'m Path)> + 'm>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
