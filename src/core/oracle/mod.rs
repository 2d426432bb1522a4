//! Compiler-as-oracle dependency discovery.
//!
//! The real compiler decides which source files a compilation unit needs.
//! [`JavacOracle`] runs `javac -verbose` against the registered source roots
//! and reads back which source-path files it opened. Whether the compile
//! succeeds is irrelevant: diagnostics are discarded and only file access
//! counts.

pub mod trace;

use std::{
    env,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};
use tempfile::TempDir;
use tracing::{debug, instrument, warn};

use self::trace::{AccessMonitor, SourcePathFilter};
use crate::core::resolve::DependencySet;
use crate::infra::config::OracleConfig;

/// Directories the oracle resolves referenced types from.
/// Only ever grows during one extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoots
{
    roots: Vec<PathBuf>,
}

impl SourceRoots
{
    /// Register `root`; duplicates are ignored.
    pub fn add(
        &mut self,
        root: PathBuf,
    )
    {
        if !self
            .roots
            .contains(&root)
        {
            self.roots
                .push(root);
        }
    }

    pub fn as_slice(&self) -> &[PathBuf]
    {
        &self.roots
    }

    pub fn len(&self) -> usize
    {
        self.roots
            .len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.roots
            .is_empty()
    }
}

/// Discovers the source files touched while compiling `entry_units`.
pub trait DependencyOracle
{
    /// Files read from `source_roots`; entry units themselves are excluded.
    /// Unresolvable references are not an error.
    fn discover(
        &self,
        entry_units: &[PathBuf],
        source_roots: &SourceRoots,
    ) -> Result<DependencySet>;
}

/// Oracle backed by a `javac` subprocess and its verbose trace.
#[derive(Debug, Clone)]
pub struct JavacOracle
{
    javac: PathBuf,
    extra_args: Vec<String>,
    source_ext: String,
}

impl JavacOracle
{
    pub fn new(
        javac: PathBuf,
        extra_args: Vec<String>,
        source_ext: &str,
    ) -> Self
    {
        Self { javac, extra_args, source_ext: source_ext.to_string() }
    }

    /// Locate javac: explicit path, then config, then `$JAVA_HOME/bin`, then PATH.
    pub fn detect(
        explicit: Option<&Path>,
        config: &OracleConfig,
        source_ext: &str,
    ) -> Result<Self>
    {
        let javac = explicit
            .map(Path::to_path_buf)
            .or_else(|| config.javac.clone())
            .or_else(java_home_javac)
            .unwrap_or_else(|| PathBuf::from("javac"));

        let output = Command::new(&javac)
            .arg("-version")
            .output()
            .with_context(|| format!("javac executable not found: {}", javac.display()))?;

        if !output.status.success()
        {
            bail!("{} -version failed", javac.display());
        }

        // JDK 8 prints the version on stderr, later releases on stdout
        let version = String::from_utf8_lossy(if output.stdout.is_empty() { &output.stderr } else { &output.stdout })
            .trim()
            .to_string();
        debug!(javac = %javac.display(), %version, "using compiler oracle");

        Ok(Self::new(javac, config.extra_args.clone(), source_ext))
    }

    pub fn javac(&self) -> &Path
    {
        &self.javac
    }

    fn command(
        &self,
        entry_units: &[PathBuf],
        source_roots: &SourceRoots,
        class_output: &Path,
    ) -> Result<Command>
    {
        let source_path = env::join_paths(source_roots.as_slice())
            .context("source root contains the path separator")?;

        let mut cmd = Command::new(&self.javac);
        cmd.arg("-verbose")
            .arg("-implicit:none")
            .arg("-proc:none")
            .arg("-nowarn")
            .arg("-d")
            .arg(class_output)
            // An empty class path keeps stray CLASSPATH entries out of resolution
            .arg("-classpath")
            .arg(class_output)
            .arg("-sourcepath")
            .arg(source_path)
            .args(&self.extra_args)
            .args(entry_units);

        Ok(cmd)
    }
}

impl DependencyOracle for JavacOracle
{
    #[instrument(skip_all, fields(entry = ?entry_units.first(), roots = source_roots.len()))]
    fn discover(
        &self,
        entry_units: &[PathBuf],
        source_roots: &SourceRoots,
    ) -> Result<DependencySet>
    {
        let class_output = TempDir::with_prefix("clses")
            .context("Failed to create class output directory")?;

        let output = self
            .command(entry_units, source_roots, class_output.path())?
            .output()
            .with_context(|| format!("Failed to run {}", self.javac.display()))?;

        // Exit status ignored: only the access trace matters
        debug!(status = ?output.status.code(), "javac finished");

        let mut monitor = AccessMonitor::new(
            SourcePathFilter::new(source_roots.as_slice()),
            entry_units,
            &self.source_ext,
        );
        monitor.observe_trace(&String::from_utf8_lossy(&output.stderr));
        monitor.observe_trace(&String::from_utf8_lossy(&output.stdout));

        let unclaimed = monitor.unclaimed_source_path();
        if !unclaimed.is_empty()
        {
            warn!(entries = ?unclaimed, "javac searched source path entries outside the registered roots");
        }

        let used = monitor.finish();
        debug!(found = used.len(), "dependencies discovered");

        Ok(used)
    }
}

fn java_home_javac() -> Option<PathBuf>
{
    let home = env::var_os("JAVA_HOME")?;
    let exe = if cfg!(windows) { "javac.exe" } else { "javac" };
    let candidate = PathBuf::from(home)
        .join("bin")
        .join(exe);
    candidate
        .is_file()
        .then_some(candidate)
}
