//! Source discovery and file I/O for the migration driver.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which files under the root take part in a migration.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    extensions: Vec<String>,
    exclude: GlobSet,
}

impl SourceFilter {
    /// Build a filter from extension names (with or without a leading dot)
    /// and exclusion globs.
    pub fn new<E, G>(extensions: E, exclude: G) -> Result<Self>
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        let mut builder = GlobSetBuilder::new();
        for pattern in exclude {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern)
                .with_context(|| format!("invalid exclude pattern '{pattern}'"))?;
            builder.add(glob);
        }
        let exclude = builder.build().context("failed to build exclude patterns")?;

        Ok(Self {
            extensions,
            exclude,
        })
    }

    pub fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(ext))
            })
    }

    /// Whether `relative` (a path below the root) matches an exclude glob.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        !relative.as_os_str().is_empty() && self.exclude.is_match(relative)
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            extensions: vec!["ts".to_string()],
            exclude: GlobSet::empty(),
        }
    }
}

/// Discover all source files below `root`, recursively.
///
/// Entries are visited in file-name order at every level, so the result is
/// stable across runs. Walk errors (unreadable directories, entries vanishing
/// mid-walk) are returned, not skipped.
pub fn discover_sources(root: &Path, filter: &SourceFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            !filter.is_excluded(relative)
        });

    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to walk directory {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if filter.has_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

pub fn read_source_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn write_source_file(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
#[path = "driver_sources_tests.rs"]
mod tests;
