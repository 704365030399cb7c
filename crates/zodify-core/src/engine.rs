//! Rewrite engine.
//!
//! A single pre-order traversal of one module. Rules are tried on a node
//! before its children are visited, so chain checks like "is this
//! `.required()` rooted at `Joi`" see the module's original names. Replaced
//! expressions go straight back into the parent's slot; replaced import
//! statements are spliced into the statement list in place of the original.

use std::fmt;

use swc_core::ecma::ast::{
    ExportAll, Expr, Module, ModuleDecl, ModuleItem, NamedExport, Prop, TsEntityName,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};
use tracing::{debug, trace, warn};

use crate::rules::{Namespaces, Rule, RuleSet};

/// How many times each rule fired in one module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    fired: [usize; Rule::COUNT],
}

impl RewriteStats {
    pub fn record(&mut self, rule: Rule) {
        self.fired[rule as usize] += 1;
    }

    pub fn count(&self, rule: Rule) -> usize {
        self.fired[rule as usize]
    }

    pub fn total(&self) -> usize {
        self.fired.iter().sum()
    }

    pub fn changed(&self) -> bool {
        self.total() > 0
    }

    pub fn merge(&mut self, other: &RewriteStats) {
        for rule in Rule::ALL {
            self.fired[rule as usize] += other.count(rule);
        }
    }
}

impl fmt::Display for RewriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for rule in Rule::ALL {
            let count = self.count(rule);
            if count == 0 {
                continue;
            }
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{}={count}", rule.name())?;
            first = false;
        }
        if first {
            f.write_str("no rewrites")?;
        }
        Ok(())
    }
}

pub struct RewriteEngine<'r> {
    rules: &'r RuleSet,
    namespaces: Namespaces,
    stats: RewriteStats,
}

impl<'r> RewriteEngine<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self {
            rules,
            namespaces: Namespaces::new(rules.config().target_namespace.as_str()),
            stats: RewriteStats::default(),
        }
    }

    /// Rewrite `module` in place and report what fired.
    pub fn rewrite_module(rules: &'r RuleSet, module: &mut Module) -> RewriteStats {
        let mut engine = Self::new(rules);
        module.visit_mut_with(&mut engine);
        engine.stats
    }

    pub fn stats(&self) -> RewriteStats {
        self.stats
    }

    fn fired(&mut self, rule: Rule) {
        debug!(rule = rule.name(), "rule fired");
        self.stats.record(rule);
    }
}

impl VisitMut for RewriteEngine<'_> {
    fn visit_mut_module(&mut self, module: &mut Module) {
        if !self.rules.references_source(module) {
            trace!("module does not reference the source library");
            return;
        }
        self.namespaces = self.rules.namespaces_for(module);
        if self.namespaces.is_active() && self.namespaces.target_name_taken(module) {
            warn!(
                target_namespace = self.namespaces.target(),
                "target namespace name is already used in this module, leaving it unchanged"
            );
            return;
        }
        module.visit_mut_children_with(self);
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        let mut rewritten = Vec::with_capacity(items.len());
        for mut item in items.drain(..) {
            if let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = &item
                && let Some(replacement) = self.rules.rewrite_import(decl, &self.namespaces)
            {
                self.fired(Rule::SourceImport);
                if self.namespaces.binds_target(&replacement) {
                    self.namespaces.mark_target_bound();
                }
                rewritten.extend(replacement);
                continue;
            }
            item.visit_mut_with(self);
            rewritten.push(item);
        }
        *items = rewritten;
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        while let Some((rule, replacement)) = self.rules.rewrite_expr(expr, &self.namespaces) {
            *expr = replacement;
            self.fired(rule);
            if !rule.requeues_replacement() {
                break;
            }
        }
        expr.visit_mut_children_with(self);
    }

    fn visit_mut_ts_entity_name(&mut self, name: &mut TsEntityName) {
        if let Some(replacement) = self.rules.rewrite_entity_name(name, &self.namespaces) {
            *name = replacement;
            self.fired(Rule::NamespaceReference);
            return;
        }
        name.visit_mut_children_with(self);
    }

    fn visit_mut_prop(&mut self, prop: &mut Prop) {
        if let Some(replacement) = self.rules.rewrite_prop(prop, &self.namespaces) {
            *prop = replacement;
            self.fired(Rule::NamespaceReference);
        }
        prop.visit_mut_children_with(self);
    }

    fn visit_mut_named_export(&mut self, export: &mut NamedExport) {
        if let Some(src) = &export.src {
            let Some(retargeted) = self.rules.rewrite_reexport_source(src) else {
                return;
            };
            export.src = Some(Box::new(retargeted));
            self.fired(Rule::SourceImport);
            for specifier in &mut export.specifiers {
                if let Some(replacement) = self.rules.rewrite_reexport_specifier(specifier) {
                    *specifier = replacement;
                }
            }
            return;
        }
        for specifier in &mut export.specifiers {
            if let Some(replacement) = self
                .rules
                .rewrite_export_specifier(specifier, &self.namespaces)
            {
                *specifier = replacement;
                self.fired(Rule::NamespaceReference);
            }
        }
    }

    fn visit_mut_export_all(&mut self, export: &mut ExportAll) {
        if let Some(retargeted) = self.rules.rewrite_reexport_source(&export.src) {
            export.src = Box::new(retargeted);
            self.fired(Rule::SourceImport);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
