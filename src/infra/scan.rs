//! Line-oriented pattern scanning over corpus files.
//!
//! Candidate lines are found with grep-searcher (ripgrep's searcher core) so
//! large or oddly-encoded sources are read lossily and stop early. The
//! per-line capture is then taken with a plain `regex::Regex`.

use std::{collections::BTreeSet, path::Path};

use anyhow::{Context, Result};
use grep_regex::{RegexMatcher, RegexMatcherBuilder};
use grep_searcher::{BinaryDetection, Searcher, SearcherBuilder, sinks::Lossy};
use regex::Regex;

/// Compiled pattern usable both for line selection and capture extraction.
#[derive(Debug, Clone)]
pub struct LineScanner
{
    matcher: RegexMatcher,
    regex: Regex,
}

impl LineScanner
{
    /// Compile `pattern`. Matches never span a line terminator.
    pub fn new(pattern: &str) -> Result<Self>
    {
        let matcher = RegexMatcherBuilder::new()
            .multi_line(true)
            .line_terminator(Some(b'\n'))
            .build(pattern)
            .with_context(|| format!("invalid pattern: {pattern}"))?;

        let regex = Regex::new(pattern).with_context(|| format!("invalid pattern: {pattern}"))?;

        Ok(Self { matcher, regex })
    }

    /// First line of `path` matching the pattern, without its terminator.
    pub fn first_line(
        &self,
        path: &Path,
    ) -> Result<Option<String>>
    {
        let mut found = None;

        searcher()
            .search_path(
                &self.matcher,
                path,
                Lossy(|_, line| {
                    found = Some(strip_terminator(line).to_string());
                    Ok(false)
                }),
            )
            .with_context(|| format!("Failed to scan {}", path.display()))?;

        Ok(found)
    }

    /// Capture of the first match in `path`: group 1 when the pattern has
    /// groups, else the whole match.
    pub fn first_capture(
        &self,
        path: &Path,
    ) -> Result<Option<String>>
    {
        let mut found = None;

        searcher()
            .search_path(
                &self.matcher,
                path,
                Lossy(|_, line| {
                    found = self.capture(strip_terminator(line));
                    // Keep going only if the line-level hit did not capture
                    Ok(found.is_none())
                }),
            )
            .with_context(|| format!("Failed to scan {}", path.display()))?;

        Ok(found)
    }

    /// Every capture across all lines of `path`.
    pub fn all_captures(
        &self,
        path: &Path,
    ) -> Result<BTreeSet<String>>
    {
        let mut found = BTreeSet::new();

        searcher()
            .search_path(
                &self.matcher,
                path,
                Lossy(|_, line| {
                    found.extend(self.captures_in(strip_terminator(line)));
                    Ok(true)
                }),
            )
            .with_context(|| format!("Failed to scan {}", path.display()))?;

        Ok(found)
    }

    /// Every match of the pattern within a single line of text.
    pub fn captures_in(
        &self,
        line: &str,
    ) -> Vec<String>
    {
        let group = usize::from(self.regex.captures_len() > 1);

        self.regex
            .captures_iter(line)
            .filter_map(|caps| caps.get(group))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn capture(
        &self,
        line: &str,
    ) -> Option<String>
    {
        self.captures_in(line)
            .into_iter()
            .next()
    }
}

fn searcher() -> Searcher
{
    SearcherBuilder::new()
        .binary_detection(BinaryDetection::quit(b'\x00'))
        // The Lossy sink reports line numbers and refuses to run without them
        .line_number(true)
        .build()
}

fn strip_terminator(line: &str) -> &str
{
    line.trim_end_matches(['\n', '\r'])
}
