//! Copies a resolved closure into the output root.
//!
//! Files keep their corpus-relative location, permissions and modification
//! time. The first failing copy aborts the run.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use indicatif::ProgressBar;
use tracing::debug;

use crate::core::resolve::DependencySet;
use crate::infra::walk::CorpusWalker;

/// Counts of what landed in the output root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssembleStats
{
    pub files: usize,
    pub natives: usize,
}

pub struct Assembler<'a>
{
    corpus_root: &'a Path,
    output_root: &'a Path,
    ignore: &'a [String],
    progress: ProgressBar,
}

impl<'a> Assembler<'a>
{
    pub fn new(
        corpus_root: &'a Path,
        output_root: &'a Path,
    ) -> Self
    {
        Self { corpus_root, output_root, ignore: &[], progress: ProgressBar::hidden() }
    }

    /// Globs pruned from the native tree copy.
    pub fn with_ignores(
        mut self,
        ignore: &'a [String],
    ) -> Self
    {
        self.ignore = ignore;
        self
    }

    pub fn with_progress(
        mut self,
        progress: ProgressBar,
    ) -> Self
    {
        self.progress = progress;
        self
    }

    /// Output location of a corpus file.
    pub fn destination(
        &self,
        file: &Path,
    ) -> Result<PathBuf>
    {
        let rel = file
            .strip_prefix(self.corpus_root)
            .with_context(|| {
                format!("{} is outside corpus {}", file.display(), self.corpus_root.display())
            })?;
        Ok(self
            .output_root
            .join(rel))
    }

    /// Copy every file of the closure to its corpus-relative destination.
    pub fn copy_closure(
        &self,
        files: &DependencySet,
    ) -> Result<usize>
    {
        self.progress
            .set_length(files.len() as u64);

        for file in files.iter()
        {
            let dest = self.destination(file)?;
            copy_preserving(file, &dest)?;
            self.progress
                .inc(1);
        }

        Ok(files.len())
    }

    /// Copy `native_dir` wholesale under `<output>/<src_dir>/`.
    ///
    /// Nothing here passes through dependency discovery.
    pub fn copy_native_tree(
        &self,
        native_dir: &Path,
        src_dir: &str,
    ) -> Result<usize>
    {
        if !native_dir.is_dir()
        {
            bail!("Native source directory not found: {}", native_dir.display());
        }

        let base = native_dir
            .parent()
            .unwrap_or(native_dir);
        let dest_root = self
            .output_root
            .join(src_dir);

        let top = dest_root.join(
            native_dir
                .strip_prefix(base)
                .unwrap_or(native_dir),
        );
        fs::create_dir_all(&top).with_context(|| format!("Failed to create {}", top.display()))?;

        let mut copied = 0;
        for entry in CorpusWalker::new(self.ignore)?.walk_entries(native_dir)?
        {
            let rel = entry
                .path
                .strip_prefix(base)
                .with_context(|| format!("{} escaped {}", entry.path.display(), base.display()))?;
            let dest = dest_root.join(rel);

            if entry.is_dir
            {
                fs::create_dir_all(&dest)
                    .with_context(|| format!("Failed to create {}", dest.display()))?;
            }
            else if entry
                .path
                .is_dir()
            {
                // Linked directory: keep it a link
                copy_link(&entry.path, &dest)?;
            }
            else
            {
                copy_preserving(&entry.path, &dest)?;
                copied += 1;
            }
        }

        debug!(from = %native_dir.display(), files = copied, "copied native tree");
        Ok(copied)
    }
}

/// Copy one file, creating parents and carrying over the modification time.
pub fn copy_preserving(
    src: &Path,
    dest: &Path,
) -> Result<()>
{
    if let Some(parent) = dest.parent()
    {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::copy(src, dest)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dest.display()))?;

    let modified = fs::metadata(src)
        .and_then(|m| m.modified())
        .with_context(|| format!("Failed to read timestamps of {}", src.display()))?;
    File::options()
        .write(true)
        .open(dest)
        .and_then(|f| f.set_modified(modified))
        .with_context(|| format!("Failed to set timestamps on {}", dest.display()))?;

    Ok(())
}

#[cfg(unix)]
fn copy_link(
    link: &Path,
    dest: &Path,
) -> Result<()>
{
    let target = fs::read_link(link).with_context(|| format!("Failed to read link {}", link.display()))?;
    std::os::unix::fs::symlink(&target, dest)
        .with_context(|| format!("Failed to link {} -> {}", dest.display(), target.display()))
}

#[cfg(windows)]
fn copy_link(
    link: &Path,
    dest: &Path,
) -> Result<()>
{
    let target = fs::read_link(link).with_context(|| format!("Failed to read link {}", link.display()))?;
    std::os::windows::fs::symlink_dir(&target, dest)
        .with_context(|| format!("Failed to link {} -> {}", dest.display(), target.display()))
}
