//! Command-line batch runner for the `zodify` codemod.
//!
//! - `args`: command-line surface (`CliArgs`)
//! - `driver_sources`: file discovery and file I/O
//! - `driver`: the batch loop and its `BatchReport`
//! - `reporter`: terminal rendering of a report
//! - `tracing_config`: opt-in log subscriber setup

pub mod args;
pub mod driver;
pub mod driver_sources;
pub mod reporter;
pub mod tracing_config;
