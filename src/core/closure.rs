//! Dependency closure of one target test.
//!
//! Pipeline:
//! 1. classify the test directory's own files (all of them are kept);
//! 2. register the library source roots under `src`;
//! 3. in one scratch area, normalize the test tree, its ancestors, and
//!    `src/tests` into package-matching trees and register them too;
//! 4. ask the oracle about every source file, one at a time, and about a
//!    stub per class named on a script's launcher line;
//! 5. resolve symbolic bridges back to real files.
//!
//! Every source root is registered before the first oracle call.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::core::{
    descriptor::DescriptorLinks,
    normalize::{SourceTreeNormalizer, has_extension},
    oracle::{DependencyOracle, SourceRoots},
    request::ExtractionRequest,
    resolve::DependencySet,
    script::{ScriptScanner, StubUnit},
};
use crate::infra::config::{Config, LayoutConfig};

/// Kind of a file directly inside the target test directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind
{
    Source,
    Native,
    Script,
    Descriptor,
    Other,
}

impl ChildKind
{
    pub fn of(
        path: &Path,
        layout: &LayoutConfig,
    ) -> Self
    {
        if has_extension(path, &layout.source_ext)
        {
            Self::Source
        }
        else if has_extension(path, &layout.native_ext)
        {
            Self::Native
        }
        else if has_extension(path, &layout.script_ext)
        {
            Self::Script
        }
        else if has_extension(path, &layout.descriptor_ext)
        {
            Self::Descriptor
        }
        else
        {
            Self::Other
        }
    }
}

/// The target directory's own files, by kind.
#[derive(Debug, Default, Clone)]
pub struct TestContents
{
    pub files: Vec<PathBuf>,
    pub sources: Vec<PathBuf>,
    pub scripts: Vec<PathBuf>,
    pub descriptors: Vec<PathBuf>,
    pub has_natives: bool,
}

impl TestContents
{
    /// Classify the non-directory children of `test_dir` (not recursive).
    pub fn classify(
        test_dir: &Path,
        layout: &LayoutConfig,
    ) -> Result<Self>
    {
        let mut children: Vec<PathBuf> = fs::read_dir(test_dir)
            .with_context(|| format!("Failed to list {}", test_dir.display()))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()
            .with_context(|| format!("Failed to list {}", test_dir.display()))?;
        children.sort();

        let mut contents = Self::default();
        for child in children
        {
            if child.is_dir()
            {
                continue;
            }

            match ChildKind::of(&child, layout)
            {
                ChildKind::Source => contents
                    .sources
                    .push(child.clone()),
                ChildKind::Native => contents.has_natives = true,
                ChildKind::Script => contents
                    .scripts
                    .push(child.clone()),
                ChildKind::Descriptor => contents
                    .descriptors
                    .push(child.clone()),
                ChildKind::Other =>
                {}
            }
            contents
                .files
                .push(child);
        }

        Ok(contents)
    }
}

/// Library roots: `src` plus its module-namespaced children.
pub fn library_roots(
    src_root: &Path,
    layout: &LayoutConfig,
) -> Result<SourceRoots>
{
    let mut roots = SourceRoots::default();
    roots.add(src_root.to_path_buf());

    let mut modules = Vec::new();
    for entry in
        fs::read_dir(src_root).with_context(|| format!("Failed to list {}", src_root.display()))?
    {
        let path = entry?.path();
        let Some(name) = path
            .file_name()
            .and_then(|n| n.to_str())
        else
        {
            continue;
        };

        if path.is_dir()
            && name.starts_with(&layout.module_prefix)
            && !name.ends_with(&layout.module_suffix)
        {
            modules.push(path);
        }
    }

    modules.sort();
    for module in modules
    {
        roots.add(module);
    }

    Ok(roots)
}

/// Result of a closure computation.
#[derive(Debug, Clone)]
pub struct Closure
{
    /// Real files, bridges resolved
    pub files: DependencySet,
    /// The test carries native sources
    pub has_natives: bool,
}

/// Computes the dependency closure of a request with a given oracle.
pub struct ClosureBuilder<'a, O: DependencyOracle>
{
    request: &'a ExtractionRequest,
    config: &'a Config,
    oracle: &'a O,
    progress: ProgressBar,
}

impl<'a, O: DependencyOracle> ClosureBuilder<'a, O>
{
    pub fn new(
        request: &'a ExtractionRequest,
        config: &'a Config,
        oracle: &'a O,
    ) -> Self
    {
        Self { request, config, oracle, progress: ProgressBar::hidden() }
    }

    /// Report oracle invocations on `progress`.
    pub fn with_progress(
        mut self,
        progress: ProgressBar,
    ) -> Self
    {
        self.progress = progress;
        self
    }

    pub fn build(&self) -> Result<Closure>
    {
        let layout = &self
            .config
            .layout;
        let test_dir = &self
            .request
            .test_dir;

        let contents = TestContents::classify(test_dir, layout)?;
        let mut deps: DependencySet = contents
            .files
            .iter()
            .cloned()
            .collect();

        let links = DescriptorLinks::new()?;
        for page in &contents.descriptors
        {
            for linked in links.linked_files(page, &self.request.corpus_root)?
            {
                deps.insert(linked);
            }
        }

        let scripts = ScriptScanner::new(&self.config.script)?;
        let mut candidates = Vec::new();
        let mut seen = BTreeSet::new();
        for script in &contents.scripts
        {
            for class_name in scripts.class_candidates(script)?
            {
                if seen.insert(class_name.clone())
                {
                    candidates.push(class_name);
                }
            }
        }

        info!(
            test = %test_dir.display(),
            files = contents.files.len(),
            sources = contents.sources.len(),
            script_classes = candidates.len(),
            "classified test directory"
        );

        let src_root = self
            .request
            .src_root(layout);
        let mut roots = library_roots(&src_root, layout)?;

        let scratch = TempDir::with_prefix("jck-extr").context("Failed to create scratch directory")?;
        self.add_fixed_roots(scratch.path(), &src_root, &mut roots)?;
        let roots = roots;
        debug!(roots = ?roots.as_slice(), "source roots registered");

        self.progress
            .set_length((contents.sources.len() + candidates.len()) as u64);

        // One entry unit per invocation keeps the closure attributable
        for source in &contents.sources
        {
            self.progress
                .set_message(display_name(source));
            deps.union(
                self.oracle
                    .discover(std::slice::from_ref(source), &roots)?,
            );
            self.progress
                .inc(1);
        }

        for class_name in &candidates
        {
            self.progress
                .set_message(class_name.clone());
            let stub = StubUnit::write(scratch.path(), class_name)?;
            let found = self
                .oracle
                .discover(&[stub.path().to_path_buf()], &roots)?;
            if found.is_empty()
            {
                debug!(%class_name, "script class did not resolve");
            }
            deps.union(found);
            stub.remove()?;
            self.progress
                .inc(1);
        }

        // Bridges live in the scratch area: resolve before it is dropped
        let files = deps.resolve_bridges()?;

        scratch
            .close()
            .context("Failed to delete scratch directory")?;

        Ok(Closure { files, has_natives: contents.has_natives })
    }

    /// Normalize the test tree, its ancestors, and `src/tests` under `scratch`.
    fn add_fixed_roots(
        &self,
        scratch: &Path,
        src_root: &Path,
        roots: &mut SourceRoots,
    ) -> Result<()>
    {
        let layout = &self
            .config
            .layout;
        let normalizer = SourceTreeNormalizer::new(layout)?;
        let tests_root = self
            .request
            .tests_root(layout);

        let fixed_tests = scratch.join("tests");
        fs::create_dir_all(&fixed_tests)
            .with_context(|| format!("Failed to create {}", fixed_tests.display()))?;
        normalizer.normalize(&self.request.test_dir, &fixed_tests, true)?;

        // Package-mates sitting beside each ancestor directory
        let mut current = self
            .request
            .test_dir
            .parent();
        while let Some(dir) = current
        {
            if dir == tests_root || !dir.starts_with(&tests_root)
            {
                break;
            }
            normalizer.normalize(dir, &fixed_tests, false)?;
            current = dir.parent();
        }
        roots.add(fixed_tests);

        let src_tests = src_root.join(&layout.tests_dir);
        if src_tests.is_dir()
        {
            let fixed_src_tests = scratch.join("src-tests");
            fs::create_dir_all(&fixed_src_tests)
                .with_context(|| format!("Failed to create {}", fixed_src_tests.display()))?;
            normalizer.normalize(&src_tests, &fixed_src_tests, true)?;
            roots.add(fixed_src_tests);
        }

        Ok(())
    }
}

fn display_name(path: &Path) -> String
{
    path.file_name()
        .map(|n| {
            n.to_string_lossy()
                .into_owned()
        })
        .unwrap_or_default()
}
