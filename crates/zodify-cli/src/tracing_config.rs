//! Log subscriber setup for the `zodify` binary.
//!
//! Logging is off unless `-v` is given or `ZODIFY_LOG` holds filter
//! directives in `RUST_LOG` syntax. Each migrated file gets a `migrate_file`
//! span carrying its path; `--log-format tree` nests the file's events under it.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use tracing_tree::HierarchicalLayer;

/// Crate targets `-v` turns on. Dependencies stay quiet.
const OWN_TARGETS: [&str; 3] = ["zodify", "zodify_cli", "zodify_core"];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// One line per event.
    #[default]
    Text,
    /// Events indented under the span of the file they belong to.
    Tree,
    /// One JSON object per event, span fields included.
    Json,
}

fn verbosity_level(verbose: u8) -> Option<LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(LevelFilter::INFO),
        2 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    }
}

/// `ZODIFY_LOG` directives win over `-v`. `None` means log nothing.
fn build_filter(directives: Option<&str>, verbose: u8) -> Option<EnvFilter> {
    if let Some(directives) = directives {
        return Some(EnvFilter::builder().parse_lossy(directives));
    }
    let level = verbosity_level(verbose)?;
    let directives = OWN_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    Some(EnvFilter::builder().parse_lossy(directives))
}

/// Install the global subscriber. Output goes to stderr; stdout carries the
/// batch summary.
pub fn init_tracing(format: LogFormat, verbose: u8) {
    let directives = std::env::var("ZODIFY_LOG").ok();
    let Some(filter) = build_filter(directives.as_deref(), verbose) else {
        return;
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init(),
        LogFormat::Tree => registry
            .with(
                HierarchicalLayer::new(2)
                    .with_bracketed_fields(true)
                    .with_targets(false)
                    .with_verbose_exit(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
