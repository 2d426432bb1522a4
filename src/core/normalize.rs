//! Canonical `package/Class.java` trees built from symlinks.
//!
//! Corpus sources are not reliably stored in directories matching their
//! declared package, which the compiler's source path requires. The
//! normalizer mirrors each package-bearing source file into a scratch tree at
//! `<dest>/<package segments>/<file name>` as a symbolic bridge back to the
//! real file. The source directory is never modified.

use std::{
    ffi::OsStr,
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, trace};

use crate::infra::{config::LayoutConfig, scan::LineScanner, walk::CorpusWalker};

const PACKAGE_PATTERN: &str = r"^\s*package\s+([A-Za-z0-9$_.-]+)\s*;";

/// Dotted package name from a source file's first `package` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDeclaration(String);

impl PackageDeclaration
{
    pub fn new(name: impl Into<String>) -> Self
    {
        Self(name.into())
    }

    pub fn name(&self) -> &str
    {
        &self.0
    }

    /// Relative directory for this package (`a.b.c` -> `a/b/c`).
    pub fn relative_dir(&self) -> PathBuf
    {
        self.0
            .split('.')
            .filter(|seg| !seg.is_empty())
            .collect()
    }
}

/// Outcome counters for one `normalize` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeStats
{
    pub bridges: usize,
    /// Files whose canonical location was already taken
    pub shadowed: usize,
    /// Source files without a package statement
    pub unpackaged: usize,
}

pub struct SourceTreeNormalizer
{
    layout: LayoutConfig,
    package: LineScanner,
}

impl SourceTreeNormalizer
{
    pub fn new(layout: &LayoutConfig) -> Result<Self>
    {
        Ok(Self { layout: layout.clone(), package: LineScanner::new(PACKAGE_PATTERN)? })
    }

    /// Parse the package declaration of `file`, if any.
    pub fn package_of(
        &self,
        file: &Path,
    ) -> Result<Option<PackageDeclaration>>
    {
        Ok(self
            .package
            .first_capture(file)?
            .map(PackageDeclaration))
    }

    /// Mirror `source_dir` into `dest_root` by package. With `recursive`
    /// false only the direct children of `source_dir` are considered.
    ///
    /// A directory holding the module descriptor contributes none of its
    /// files. Existing entries in `dest_root` are never overwritten: the
    /// first file to claim a canonical location keeps it.
    pub fn normalize(
        &self,
        source_dir: &Path,
        dest_root: &Path,
        recursive: bool,
    ) -> Result<NormalizeStats>
    {
        let walker = CorpusWalker::new(&self.layout.ignore)?.with_max_depth((!recursive).then_some(1));
        let groups = walker.files_by_dir(source_dir)?;
        let mut stats = NormalizeStats::default();

        for (dir, files) in groups
        {
            if files
                .iter()
                .any(|f| f.file_name() == Some(OsStr::new(&self.layout.module_descriptor)))
            {
                trace!(dir = %dir.display(), "module descriptor present, skipping siblings");
                continue;
            }

            for file in files
            {
                if !has_extension(&file, &self.layout.source_ext)
                {
                    continue;
                }

                let Some(package) = self.package_of(&file)?
                else
                {
                    stats.unpackaged += 1;
                    continue;
                };

                let Some(file_name) = file.file_name()
                else
                {
                    continue;
                };

                let pkg_dir = dest_root.join(package.relative_dir());
                fs::create_dir_all(&pkg_dir)
                    .with_context(|| format!("Failed to create {}", pkg_dir.display()))?;

                let link = pkg_dir.join(file_name);
                if fs::symlink_metadata(&link).is_ok()
                {
                    debug!(
                        file = %file.display(),
                        location = %link.display(),
                        "canonical location already bridged, keeping first"
                    );
                    stats.shadowed += 1;
                    continue;
                }

                create_bridge(&file, &link).with_context(|| {
                    format!("Failed to link {} -> {}", link.display(), file.display())
                })?;
                stats.bridges += 1;
            }
        }

        debug!(
            source = %source_dir.display(),
            dest = %dest_root.display(),
            recursive,
            bridges = stats.bridges,
            shadowed = stats.shadowed,
            "normalized source tree"
        );

        Ok(stats)
    }
}

pub(crate) fn has_extension(
    path: &Path,
    ext: &str,
) -> bool
{
    path.extension()
        .is_some_and(|e| e == ext)
}

#[cfg(unix)]
fn create_bridge(
    target: &Path,
    link: &Path,
) -> io::Result<()>
{
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_bridge(
    target: &Path,
    link: &Path,
) -> io::Result<()>
{
    std::os::windows::fs::symlink_file(target, link)
}
