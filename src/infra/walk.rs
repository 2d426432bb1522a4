//! Filepath: src/infra/walk.rs
//! Ordered corpus walker.
//! - Sees every entry: no .gitignore, hidden-file, or parent-ignore filtering
//! - Optional extra ignore globs (early prune + late filter)
//! - Optional max depth; symlinks are reported, never followed
//! - Entries within a directory come in file-name order
//! - Walk errors are returned, not dropped
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

/// One visited entry below the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry
{
    pub path: PathBuf,
    /// Real directory (a symlink to a directory is not one)
    pub is_dir: bool,
    /// 1 for direct children of the root
    pub depth: usize,
}

/// Corpus walker with optional extra ignore globs and a depth limit.
/// Extra globs are applied in two places:
///   1) Early: prune directories during traversal (filter_entry).
///   2) Late: filter out files that still slipped through.
pub struct CorpusWalker
{
    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,

    /// Maximum recursion depth; default None (unbounded)
    max_depth: Option<usize>,
}

impl CorpusWalker
{
    /// Build a walker with additional ignore patterns (e.g., "**/SCCS/**").
    /// Patterns match on paths relative to the walk root.
    pub fn new(additional_ignores: &[String]) -> Result<Self>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in additional_ignores
        {
            builder.add(Glob::new(pattern).with_context(|| format!("invalid glob: {pattern}"))?);
        }

        Ok(Self { ignore_patterns: builder.build()?, max_depth: None })
    }

    /// (Optional) Limit recursion depth (`None` = unbounded, `Some(1)` = children only).
    pub fn with_max_depth(
        mut self,
        depth: Option<usize>,
    ) -> Self
    {
        self.max_depth = depth;
        self
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // A corpus is data, not a repository: see everything
        b.standard_filters(false);
        b.follow_links(false);
        b.max_depth(self.max_depth);
        b.sort_by_file_name(|a, b| a.cmp(b));

        let extra = self
            .ignore_patterns
            .clone();
        let base = root.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            let is_dir = ent
                .file_type()
                .is_some_and(|ft| ft.is_dir());

            if is_dir && ent.depth() > 0
            {
                let rel = ent
                    .path()
                    .strip_prefix(&base)
                    .unwrap_or(ent.path());
                return !extra.is_match(rel);
            }
            true
        });

        b
    }

    /// Every entry below `root` in walk order (parents before children).
    pub fn walk_entries<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Result<Vec<WalkEntry>>
    {
        let root_path = root.as_ref();
        let mut out = Vec::new();

        for res in self
            .build_walk(root_path)
            .build()
        {
            let entry = res.with_context(|| format!("Failed to walk {}", root_path.display()))?;

            if entry.depth() == 0
            {
                continue;
            }

            let is_dir = entry
                .file_type()
                .is_some_and(|ft| ft.is_dir());

            if !is_dir && self.is_ignored(root_path, entry.path())
            {
                continue;
            }

            out.push(WalkEntry { is_dir, depth: entry.depth(), path: entry.into_path() });
        }

        Ok(out)
    }

    /// Non-directory entries below `root`, sorted.
    pub fn walk_files<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Result<Vec<PathBuf>>
    {
        let mut out: Vec<PathBuf> = self
            .walk_entries(root)?
            .into_iter()
            .filter(|e| !e.is_dir)
            .map(|e| e.path)
            .collect();

        out.sort();

        Ok(out)
    }

    /// Non-directory entries grouped by their containing directory.
    /// Each group is in file-name order.
    pub fn files_by_dir<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Result<BTreeMap<PathBuf, Vec<PathBuf>>>
    {
        let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

        for file in self.walk_files(root)?
        {
            let dir = file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            groups
                .entry(dir)
                .or_default()
                .push(file);
        }

        Ok(groups)
    }

    /// Late file-level extra ignore filtering using RELATIVE path
    fn is_ignored(
        &self,
        root: &Path,
        path: &Path,
    ) -> bool
    {
        let rel = path
            .strip_prefix(root)
            .unwrap_or(path);
        self.ignore_patterns
            .is_match(rel)
    }
}
