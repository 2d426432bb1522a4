//! Class names referenced from launcher scripts.
//!
//! Shell-driven tests name their main classes only on the runtime launcher
//! line. Each dotted token on that line is a candidate class name; the
//! compiler decides which ones are real by resolving a throwaway unit that
//! imports the candidate and declares a field of its type.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::infra::{config::ScriptConfig, scan::LineScanner};

/// Name of the synthesized compilation unit.
pub const STUB_CLASS: &str = "DummyExtractorClass";

pub struct ScriptScanner
{
    launcher: LineScanner,
    class_name: LineScanner,
}

impl ScriptScanner
{
    pub fn new(config: &ScriptConfig) -> Result<Self>
    {
        Ok(Self {
            launcher: LineScanner::new(&config.launcher_pattern)?,
            class_name: LineScanner::new(&config.class_pattern)?,
        })
    }

    /// Candidate class names on the first launcher line of `script`,
    /// in order of appearance. No launcher line yields no candidates.
    pub fn class_candidates(
        &self,
        script: &Path,
    ) -> Result<Vec<String>>
    {
        let Some(line) = self
            .launcher
            .first_line(script)?
        else
        {
            return Ok(Vec::new());
        };

        Ok(self
            .class_name
            .captures_in(&line))
    }
}

/// Source text of a unit that forces resolution of `class_name`.
pub fn stub_source(class_name: &str) -> String
{
    format!("import {class_name};\nclass {STUB_CLASS} {{\n{class_name} field;\n}}\n")
}

/// Scratch stub file, removed on drop.
pub struct StubUnit
{
    path: PathBuf,
    removed: bool,
}

impl StubUnit
{
    /// Write the stub for `class_name` into `dir`.
    pub fn write(
        dir: &Path,
        class_name: &str,
    ) -> Result<Self>
    {
        let path = dir.join(format!("{STUB_CLASS}.java"));
        fs::write(&path, stub_source(class_name))
            .with_context(|| format!("Failed to write stub {}", path.display()))?;
        Ok(Self { path, removed: false })
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Remove the stub now, reporting failure.
    pub fn remove(mut self) -> Result<()>
    {
        self.removed = true;
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to delete stub {}", self.path.display()))
    }
}

impl Drop for StubUnit
{
    fn drop(&mut self)
    {
        if !self.removed
        {
            let _ = fs::remove_file(&self.path);
        }
    }
}
