//! Per-module entry point: parse, rewrite, generate.

use std::path::Path;

use swc_core::common::{GLOBALS, Globals};
use tracing::{debug, instrument};

use crate::config::MigrationConfig;
use crate::engine::{RewriteEngine, RewriteStats};
use crate::error::TransformError;
use crate::rules::RuleSet;
use crate::syntax::{emit_module, parse_module, resolve_bindings};

/// Result of migrating one module.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub code: String,
    pub stats: RewriteStats,
}

impl Transformed {
    pub fn changed(&self) -> bool {
        self.stats.changed()
    }
}

/// Migrates module text with a fixed rule set.
///
/// Holds no per-module state, so one `Migrator` serves a whole batch.
#[derive(Debug, Clone)]
pub struct Migrator {
    rules: RuleSet,
}

impl Migrator {
    pub fn new(config: MigrationConfig) -> Self {
        Self {
            rules: RuleSet::new(config),
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Migrate one module's source text.
    ///
    /// When no rule fires the original text is returned untouched rather than
    /// regenerated.
    #[instrument(level = "debug", skip_all, fields(file = %file_name.display()))]
    pub fn transform(&self, source: &str, file_name: &Path) -> Result<Transformed, TransformError> {
        let mut parsed = parse_module(source, file_name)?;
        let stats = GLOBALS.set(&Globals::new(), || {
            resolve_bindings(&mut parsed.module);
            RewriteEngine::rewrite_module(&self.rules, &mut parsed.module)
        });
        if !stats.changed() {
            return Ok(Transformed {
                code: source.to_string(),
                stats,
            });
        }

        let code = emit_module(&parsed)?;
        debug!(%stats, "module rewritten");
        Ok(Transformed { code, stats })
    }
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new(MigrationConfig::default())
    }
}
