//! Dependency set and symbolic-bridge resolution.

use std::{
    collections::BTreeSet,
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::trace;

/// Deduplicated file paths discovered for one extraction.
///
/// Ordered so two runs over the same inputs list files identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet
{
    entries: BTreeSet<PathBuf>,
}

impl DependencySet
{
    /// Add a path; returns false if it was already present.
    pub fn insert(
        &mut self,
        path: PathBuf,
    ) -> bool
    {
        self.entries
            .insert(path)
    }

    pub fn union(
        &mut self,
        other: DependencySet,
    )
    {
        self.entries
            .extend(other.entries);
    }

    pub fn contains(
        &self,
        path: &Path,
    ) -> bool
    {
        self.entries
            .contains(path)
    }

    pub fn len(&self) -> usize
    {
        self.entries
            .len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.entries
            .is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path>
    {
        self.entries
            .iter()
            .map(PathBuf::as_path)
    }

    /// Replace every symbolic bridge with the file it points at and collapse
    /// duplicates. Non-link entries are kept as they are.
    pub fn resolve_bridges(self) -> Result<DependencySet>
    {
        let mut resolved = DependencySet::default();

        for path in self.entries
        {
            let real = resolve_bridge(&path)?;
            if real != path
            {
                trace!(bridge = %path.display(), target = %real.display(), "resolved bridge");
            }
            resolved.insert(real);
        }

        Ok(resolved)
    }
}

impl FromIterator<PathBuf> for DependencySet
{
    fn from_iter<I: IntoIterator<Item = PathBuf>>(iter: I) -> Self
    {
        Self { entries: iter.into_iter().collect() }
    }
}

impl IntoIterator for DependencySet
{
    type Item = PathBuf;
    type IntoIter = std::collections::btree_set::IntoIter<PathBuf>;

    fn into_iter(self) -> Self::IntoIter
    {
        self.entries
            .into_iter()
    }
}

/// Target of `path` if it is a symbolic link, else `path` itself.
/// Relative link targets are taken relative to the link's directory.
pub fn resolve_bridge(path: &Path) -> Result<PathBuf>
{
    let meta = match fs::symlink_metadata(path)
    {
        Ok(meta) => meta,
        // Vanished or never existed: the copy step reports it
        Err(_) => return Ok(path.to_path_buf()),
    };

    if !meta
        .file_type()
        .is_symlink()
    {
        return Ok(path.to_path_buf());
    }

    let target =
        fs::read_link(path).with_context(|| format!("Failed to read link {}", path.display()))?;

    if target.is_absolute()
    {
        return Ok(target);
    }

    let joined = path
        .parent()
        .map(|dir| dir.join(&target))
        .unwrap_or(target);

    Ok(lexical_normalize(&joined))
}

/// Fold `.` and `..` components without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf
{
    let mut out = PathBuf::new();

    for comp in path.components()
    {
        match comp
        {
            Component::CurDir =>
            {}
            Component::ParentDir =>
            {
                if !out.pop()
                {
                    out.push(comp);
                }
            }
            other => out.push(other),
        }
    }

    out
}
