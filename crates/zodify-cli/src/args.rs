use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

use crate::tracing_config::LogFormat;

/// CLI arguments for the zodify binary.
#[derive(Parser, Debug)]
#[command(
    name = "zodify",
    version,
    about = "Rewrite Joi schemas in TypeScript sources to Zod, in place",
    override_usage = "zodify <DIR> [OPTIONS]"
)]
#[command(group(ArgGroup::new("root").required(true).args(["dir", "path"])))]
pub struct CliArgs {
    /// Directory containing the TypeScript files to migrate.
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Directory containing the TypeScript files to migrate (same as DIR).
    #[arg(short = 'p', long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// JSON file overriding module names, namespace names and schema types.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// File extensions to migrate, without the leading dot.
    #[arg(long = "ext", value_delimiter = ',', default_value = "ts")]
    pub extensions: Vec<String>,

    /// Glob of paths to leave alone; may be repeated.
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Report what would change without writing any file.
    #[arg(long = "dry-run", alias = "dryRun")]
    pub dry_run: bool,

    /// What to do when a file does not parse.
    #[arg(long = "on-parse-error", value_enum, default_value_t = ParseErrorPolicy::Abort)]
    pub on_parse_error: ParseErrorPolicy,

    /// Log progress to stderr; repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// How log events are drawn.
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CliArgs {
    /// The root directory, from either the positional argument or `--path`.
    pub fn root(&self) -> Option<&PathBuf> {
        self.dir.as_ref().or(self.path.as_ref())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum ParseErrorPolicy {
    /// Stop the whole batch at the first file that does not parse.
    #[default]
    Abort,
    /// Log the file, leave it untouched and continue.
    Skip,
}

#[cfg(test)]
#[path = "args_tests.rs"]
mod tests;
