//! Core of the `zodify` codemod: rewrites TypeScript modules that build
//! schemas with Joi so they build them with Zod instead.
//!
//! This crate provides:
//! - Migration configuration (`MigrationConfig`) and its JSON loader
//! - The pattern rule set (`RuleSet`, `Rule`)
//! - The single-pass rewrite engine (`RewriteEngine`, `RewriteStats`)
//! - Parser/generator adapters over `swc`
//! - `Migrator`, which ties the pieces together for one module

pub mod config;
pub use config::MigrationConfig;

pub mod error;
pub use error::{ConfigError, TransformError};

pub mod rules;
pub use rules::{Namespaces, Rule, RuleSet};

pub mod engine;
pub use engine::{RewriteEngine, RewriteStats};

pub mod syntax;

pub mod migrator;
pub use migrator::{Migrator, Transformed};
