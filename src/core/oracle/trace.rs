//! Parsing of `javac -verbose` traces into file-access events.
//!
//! javac reports every file object it touches as `[<verb> <FileObject>]`.
//! Three layers sit on top of the raw events:
//! - [`FileObject`] unwraps javac's file-object wrappers to one physical path
//!   so identity comparisons never depend on how javac spelled the object;
//! - [`SourcePathFilter`] claims only objects listed from the source path
//!   roots, never platform or class path objects;
//! - [`AccessMonitor`] records a claimed object the first time its content
//!   is opened, and keeps the source path javac says it searched.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::core::resolve::DependencySet;

/// A file object as printed by javac.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileObject
{
    /// `RegularFileObject[/abs/A.java]` (JDK 8)
    Regular(PathBuf),
    /// `SimpleFileObject[/abs/A.java]` (JDK 9+, explicitly named files)
    Simple(PathBuf),
    /// `DirectoryFileObject[/root:pkg/A.java]` (JDK 9+, found via a search path)
    Directory
    {
        base: PathBuf,
        relative: PathBuf,
    },
    /// Entry inside an archive (`ct.sym`, jars)
    Archive
    {
        archive: PathBuf,
        entry: String,
    },
    /// `/modules/...` entries of the runtime image
    Runtime(PathBuf),
    /// Bare path without a wrapper
    Plain(PathBuf),
}

impl FileObject
{
    /// Parse the text javac prints for a file object.
    pub fn parse(text: &str) -> Option<Self>
    {
        let text = text.trim();
        if text.is_empty()
        {
            return None;
        }

        let Some((kind, inner)) = split_wrapper(text)
        else
        {
            if text.starts_with("/modules/")
            {
                return Some(Self::Runtime(PathBuf::from(text)));
            }
            return Some(Self::Plain(PathBuf::from(text)));
        };

        let obj = match kind
        {
            "RegularFileObject" => Self::Regular(PathBuf::from(inner)),
            "SimpleFileObject" => Self::Simple(PathBuf::from(inner)),
            "DirectoryFileObject" =>
            {
                let (base, relative) = inner.rsplit_once(':')?;
                Self::Directory { base: PathBuf::from(base), relative: PathBuf::from(relative) }
            }
            "JRTFileObject" => Self::Runtime(PathBuf::from(inner)),
            _ =>
            {
                // Zip/Jar/ct.sym flavours: "archive(entry)" or "archive:entry"
                if let Some((archive, rest)) = inner.split_once('(')
                {
                    Self::Archive {
                        archive: PathBuf::from(archive),
                        entry: rest
                            .trim_end_matches(')')
                            .to_string(),
                    }
                }
                else if let Some((archive, entry)) = inner.rsplit_once(':')
                {
                    Self::Archive { archive: PathBuf::from(archive), entry: entry.to_string() }
                }
                else
                {
                    Self::Plain(PathBuf::from(inner))
                }
            }
        };

        Some(obj)
    }

    /// Physical path behind the wrapper.
    pub fn unwrap_path(&self) -> PathBuf
    {
        match self
        {
            Self::Regular(p) | Self::Simple(p) | Self::Runtime(p) | Self::Plain(p) => p.clone(),
            Self::Directory { base, relative } => base.join(relative),
            Self::Archive { archive, .. } => archive.clone(),
        }
    }

    /// Identity comparison on unwrapped paths.
    pub fn is_same_file(
        &self,
        other: &FileObject,
    ) -> bool
    {
        match (self, other)
        {
            (Self::Archive { archive: a, entry: x }, Self::Archive { archive: b, entry: y }) =>
            {
                a == b && x == y
            }
            (Self::Archive { .. }, _) | (_, Self::Archive { .. }) => false,
            _ => self.unwrap_path() == other.unwrap_path(),
        }
    }

    /// Whether the object names a source file with extension `ext`.
    pub fn is_source(
        &self,
        ext: &str,
    ) -> bool
    {
        match self
        {
            Self::Archive { entry, .. } => entry.ends_with(&format!(".{ext}")),
            _ => self
                .unwrap_path()
                .extension()
                .is_some_and(|e| e == ext),
        }
    }
}

/// Split `Kind[inner]` into its parts.
fn split_wrapper(text: &str) -> Option<(&str, &str)>
{
    let open = text.find('[')?;
    let kind = &text[..open];
    if kind.is_empty()
        || !kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    let inner = text[open + 1..].strip_suffix(']')?;
    Some((kind, inner))
}

/// Which search path a `[search path for ...]` line describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPathKind
{
    Source,
    Class,
}

/// One line of a verbose javac trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent
{
    ParsingStarted(FileObject),
    Loading(FileObject),
    SearchPath
    {
        kind: SearchPathKind,
        entries: Vec<PathBuf>,
    },
    Other,
}

impl TraceEvent
{
    pub fn parse(line: &str) -> Self
    {
        let line = line.trim();
        let Some(body) = line
            .strip_prefix('[')
            .and_then(|l| l.strip_suffix(']'))
        else
        {
            return Self::Other;
        };

        if let Some(rest) = body.strip_prefix("parsing started ")
        {
            return FileObject::parse(rest).map_or(Self::Other, Self::ParsingStarted);
        }
        if let Some(rest) = body.strip_prefix("loading ")
        {
            return FileObject::parse(rest).map_or(Self::Other, Self::Loading);
        }
        if let Some(rest) = body.strip_prefix("search path for source files:")
        {
            return Self::SearchPath { kind: SearchPathKind::Source, entries: split_entries(rest) };
        }
        if let Some(rest) = body.strip_prefix("search path for class files:")
        {
            return Self::SearchPath { kind: SearchPathKind::Class, entries: split_entries(rest) };
        }

        Self::Other
    }
}

fn split_entries(list: &str) -> Vec<PathBuf>
{
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Restricts observation to objects listed from the source path.
#[derive(Debug, Clone)]
pub struct SourcePathFilter
{
    roots: Vec<PathBuf>,
}

impl SourcePathFilter
{
    pub fn new(roots: &[PathBuf]) -> Self
    {
        Self { roots: roots.to_vec() }
    }

    pub fn claims(
        &self,
        obj: &FileObject,
    ) -> bool
    {
        match obj
        {
            FileObject::Directory { base, .. } => self
                .roots
                .iter()
                .any(|r| base.starts_with(r)),
            FileObject::Regular(p) | FileObject::Simple(p) | FileObject::Plain(p) => self.is_under_root(p),
            FileObject::Archive { .. } | FileObject::Runtime(_) => false,
        }
    }

    fn is_under_root(
        &self,
        path: &Path,
    ) -> bool
    {
        self.roots
            .iter()
            .any(|r| path.starts_with(r))
    }
}

/// Records source-path files whose content javac opened.
#[derive(Debug)]
pub struct AccessMonitor
{
    filter: SourcePathFilter,
    entries: Vec<FileObject>,
    source_ext: String,
    reported: Vec<PathBuf>,
    used: DependencySet,
}

impl AccessMonitor
{
    /// `entry_units` are never recorded, whatever path they are reached by.
    pub fn new(
        filter: SourcePathFilter,
        entry_units: &[PathBuf],
        source_ext: &str,
    ) -> Self
    {
        Self {
            filter,
            entries: entry_units
                .iter()
                .cloned()
                .map(FileObject::Plain)
                .collect(),
            source_ext: source_ext.to_string(),
            reported: Vec::new(),
            used: DependencySet::default(),
        }
    }

    pub fn observe(
        &mut self,
        event: &TraceEvent,
    )
    {
        let obj = match event
        {
            TraceEvent::ParsingStarted(obj) => obj,
            TraceEvent::Loading(obj) if obj.is_source(&self.source_ext) => obj,
            TraceEvent::SearchPath { kind: SearchPathKind::Source, entries } =>
            {
                self.reported = entries.clone();
                return;
            }
            _ => return,
        };

        if !self.filter.claims(obj)
            || self
                .entries
                .iter()
                .any(|e| e.is_same_file(obj))
        {
            return;
        }

        let path = obj.unwrap_path();
        if self.used.insert(path.clone())
        {
            trace!(file = %path.display(), "content opened");
        }
    }

    /// Feed every line of a trace.
    pub fn observe_trace(
        &mut self,
        trace_text: &str,
    )
    {
        for line in trace_text.lines()
        {
            self.observe(&TraceEvent::parse(line));
        }
    }

    /// Source path entries javac reported that none of the registered roots
    /// cover. Files below them can never be recorded.
    pub fn unclaimed_source_path(&self) -> Vec<PathBuf>
    {
        self.reported
            .iter()
            .filter(|p| !self.filter.is_under_root(p))
            .cloned()
            .collect()
    }

    pub fn finish(self) -> DependencySet
    {
        self.used
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_file_objects()
    {
        assert_eq!(
            FileObject::parse("DirectoryFileObject[/tmp/x/tests:p/q/A.java]"),
            Some(FileObject::Directory {
                base: PathBuf::from("/tmp/x/tests"),
                relative: PathBuf::from("p/q/A.java"),
            })
        );
        assert_eq!(
            FileObject::parse("RegularFileObject[/c/src/p/A.java]"),
            Some(FileObject::Regular(PathBuf::from("/c/src/p/A.java")))
        );
        assert_eq!(
            FileObject::parse("ZipFileIndexFileObject[/jdk/lib/ct.sym(META-INF/sym/rt.jar/java/lang/Object.class)]"),
            Some(FileObject::Archive {
                archive: PathBuf::from("/jdk/lib/ct.sym"),
                entry: "META-INF/sym/rt.jar/java/lang/Object.class".to_string(),
            })
        );
        assert_eq!(
            FileObject::parse("/modules/java.base/java/lang/Object.class"),
            Some(FileObject::Runtime(PathBuf::from("/modules/java.base/java/lang/Object.class")))
        );
    }

    #[test]
    fn test_unwrapped_identity()
    {
        let listed = FileObject::Directory { base: PathBuf::from("/r"), relative: PathBuf::from("p/A.java") };
        let named = FileObject::Simple(PathBuf::from("/r/p/A.java"));
        assert!(listed.is_same_file(&named));
        assert!(!listed.is_same_file(&FileObject::Simple(PathBuf::from("/r/p/B.java"))));
    }

    #[test]
    fn test_trace_events()
    {
        assert_eq!(
            TraceEvent::parse("[search path for source files: /a/src,/b/tests]"),
            TraceEvent::SearchPath {
                kind: SearchPathKind::Source,
                entries: vec![PathBuf::from("/a/src"), PathBuf::from("/b/tests")],
            }
        );
        assert_eq!(TraceEvent::parse("[parsing completed 12ms]"), TraceEvent::Other);
        assert_eq!(TraceEvent::parse("Test.java:3: error: cannot find symbol"), TraceEvent::Other);
    }

    #[test]
    fn test_monitor_records_only_source_path_content()
    {
        let roots = vec![PathBuf::from("/c/src"), PathBuf::from("/tmp/fx/tests")];
        let entry = PathBuf::from("/c/tests/api/t/T.java");
        let mut monitor = AccessMonitor::new(SourcePathFilter::new(&roots), &[entry], "java");

        monitor.observe_trace(
            "[parsing started SimpleFileObject[/c/tests/api/t/T.java]]\n\
             [parsing completed 10ms]\n\
             [search path for source files: /c/src,/tmp/fx/tests]\n\
             [loading /modules/java.base/java/lang/Object.class]\n\
             [parsing started DirectoryFileObject[/c/src:direct/pkg/DirectA.java]]\n\
             [parsing started DirectoryFileObject[/tmp/fx/tests:p/Parent.java]]\n\
             [parsing started DirectoryFileObject[/c/src:direct/pkg/DirectA.java]]\n\
             [loading RegularFileObject[/elsewhere/Lib.java]]\n\
             [wrote DirectoryFileObject[/tmp/out:T.class]]\n",
        );

        let used: Vec<_> = monitor
            .finish()
            .into_iter()
            .collect();
        assert_eq!(
            used,
            vec![PathBuf::from("/c/src/direct/pkg/DirectA.java"), PathBuf::from("/tmp/fx/tests/p/Parent.java")]
        );
    }

    #[test]
    fn test_reported_source_path_checked_against_roots()
    {
        let roots = vec![PathBuf::from("/c/src"), PathBuf::from("/tmp/fx/tests")];
        let mut monitor = AccessMonitor::new(SourcePathFilter::new(&roots), &[], "java");
        assert!(monitor.unclaimed_source_path().is_empty());

        monitor.observe_trace(
            "[search path for source files: /c/src,/tmp/fx/tests]\n\
             [search path for class files: /jdk/lib/modules,/tmp/clses]\n",
        );
        assert!(monitor.unclaimed_source_path().is_empty());

        // javac rewrote a root, e.g. through a resolved link
        monitor.observe(&TraceEvent::parse("[search path for source files: /real/src,/tmp/fx/tests]"));
        assert_eq!(monitor.unclaimed_source_path(), vec![PathBuf::from("/real/src")]);
    }

    #[test]
    fn test_monitor_skips_entry_reached_through_source_path()
    {
        let roots = vec![PathBuf::from("/tmp/fx/tests")];
        let entry = PathBuf::from("/tmp/fx/tests/p/T.java");
        let mut monitor = AccessMonitor::new(SourcePathFilter::new(&roots), &[entry], "java");

        monitor.observe(&TraceEvent::ParsingStarted(FileObject::Directory {
            base: PathBuf::from("/tmp/fx/tests"),
            relative: PathBuf::from("p/T.java"),
        }));
        assert!(monitor.finish().is_empty());
    }
}
