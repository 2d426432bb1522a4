//! Resources linked from page-like test descriptors.
//!
//! A test's HTML page may reference sibling resources by relative link
//! (`href="../data.txt"`). Those files belong to the test even though no
//! compiler ever reads them.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::infra::scan::LineScanner;

const LINK_PATTERN: &str = r#"(?i)(?:href|src)\s*=\s*"([^"]*)""#;

pub struct DescriptorLinks
{
    links: LineScanner,
}

impl DescriptorLinks
{
    pub fn new() -> Result<Self>
    {
        Ok(Self { links: LineScanner::new(LINK_PATTERN)? })
    }

    /// Existing files inside `corpus_root` linked relatively from `page`.
    pub fn linked_files(
        &self,
        page: &Path,
        corpus_root: &Path,
    ) -> Result<Vec<PathBuf>>
    {
        let Some(dir) = page.parent()
        else
        {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for link in self
            .links
            .all_captures(page)?
        {
            let Some(rel) = relative_target(&link)
            else
            {
                continue;
            };

            let Ok(target) = dunce::canonicalize(dir.join(rel))
            else
            {
                debug!(page = %page.display(), %link, "dangling link");
                continue;
            };

            if target.is_file() && target.starts_with(corpus_root)
            {
                out.push(target);
            }
        }

        Ok(out)
    }
}

/// Path part of a relative link, or None for absolute/external/anchor links.
fn relative_target(link: &str) -> Option<&str>
{
    let link = link.trim();
    if link.is_empty() || link.starts_with('/') || link.starts_with('#') || link.contains("://")
    {
        return None;
    }
    if let Some((scheme, _)) = link.split_once(':')
        && !scheme.contains('/')
    {
        // mailto:, javascript:, jar:, ...
        return None;
    }

    let end = link
        .find(['#', '?'])
        .unwrap_or(link.len());
    let path = &link[..end];
    (!path.is_empty()).then_some(path)
}
