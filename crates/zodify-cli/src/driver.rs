//! Batch driver: discover sources, migrate each one, write the results.
//!
//! Files are handled one at a time in discovery order. Nothing is rolled back:
//! when the batch stops early, files written before the failure stay written.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};
use zodify_core::{MigrationConfig, Migrator, RewriteStats};

use crate::args::{CliArgs, ParseErrorPolicy};
use crate::driver_sources::{SourceFilter, discover_sources, read_source_file, write_source_file};

/// Everything a batch run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub root: PathBuf,
    pub config: MigrationConfig,
    pub filter: SourceFilter,
    pub dry_run: bool,
    pub on_parse_error: ParseErrorPolicy,
}

impl DriverOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: MigrationConfig::default(),
            filter: SourceFilter::default(),
            dry_run: false,
            on_parse_error: ParseErrorPolicy::default(),
        }
    }

    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let Some(root) = args.root() else {
            bail!("missing directory argument");
        };
        let config = match &args.config {
            Some(path) => MigrationConfig::load(path)?,
            None => MigrationConfig::default(),
        };
        Ok(Self {
            root: root.clone(),
            config,
            filter: SourceFilter::new(&args.extensions, &args.exclude)?,
            dry_run: args.dry_run,
            on_parse_error: args.on_parse_error,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub discovered: usize,
    /// Files that changed (written unless this was a dry run).
    pub rewritten: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub skipped: Vec<SkippedFile>,
    /// Rule counts summed over all rewritten files.
    pub stats: RewriteStats,
}

/// Run a migration batch as described by the command line.
pub fn migrate(args: &CliArgs) -> Result<BatchReport> {
    let options = DriverOptions::from_args(args)?;
    run(&options)
}

pub fn run(options: &DriverOptions) -> Result<BatchReport> {
    if !options.root.is_dir() {
        bail!("'{}' is not a directory", options.root.display());
    }
    options
        .config
        .validate()
        .context("invalid migration config")?;

    let migrator = Migrator::new(options.config.clone());
    let files = discover_sources(&options.root, &options.filter)?;
    info!(count = files.len(), root = %options.root.display(), "discovered source files");

    let mut report = BatchReport {
        discovered: files.len(),
        ..BatchReport::default()
    };
    for path in files {
        migrate_file(&migrator, &path, options, &mut report)?;
    }
    Ok(report)
}

fn migrate_file(
    migrator: &Migrator,
    path: &Path,
    options: &DriverOptions,
    report: &mut BatchReport,
) -> Result<()> {
    let span = info_span!("migrate_file", path = %path.display());
    let _enter = span.enter();

    let source = read_source_file(path)?;
    let transformed = match migrator.transform(&source, path) {
        Ok(transformed) => transformed,
        Err(err) if err.is_syntax() && options.on_parse_error == ParseErrorPolicy::Skip => {
            warn!(error = %err, "skipping file that does not parse");
            report.skipped.push(SkippedFile {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
            return Ok(());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to migrate {}", path.display()));
        }
    };

    if !transformed.changed() {
        debug!("unchanged");
        report.unchanged.push(path.to_path_buf());
        return Ok(());
    }

    if options.dry_run {
        info!(stats = %transformed.stats, "would rewrite");
    } else {
        write_source_file(path, &transformed.code)?;
        info!(stats = %transformed.stats, "rewrote");
    }
    report.stats.merge(&transformed.stats);
    report.rewritten.push(path.to_path_buf());
    Ok(())
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;
