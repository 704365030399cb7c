#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use zodify_cli::args::CliArgs;
use zodify_cli::driver;
use zodify_cli::reporter::Reporter;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    zodify_cli::tracing_config::init_tracing(args.log_format, args.verbose);

    let report = driver::migrate(&args)?;

    let reporter = Reporter::new(std::io::stdout().is_terminal(), args.dry_run);
    println!("{}", reporter.render(&report));

    if !report.skipped.is_empty() {
        eprintln!(
            "{} file(s) were skipped because they do not parse",
            report.skipped.len()
        );
    }
    Ok(())
}
