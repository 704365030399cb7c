//! Pattern rules for the Joi -> Zod migration.
//!
//! Each rule pairs a syntax shape with a rewrite. Rules never mutate the node
//! they inspect: they return a replacement (or nothing) and the engine puts it
//! in place. Within one node visit the expression rules are tried in
//! [`Rule::EXPRESSION_PRIORITY`] order and the first match wins.
//!
//! | Rule | Shape | Rewrite |
//! |------|-------|---------|
//! | `SourceImport` | `import Joi from "joi"` | `import { z } from "zod"` |
//! | `OptionalCall` | `Joi.string().optional(x)` | `Joi.string().optional()` |
//! | `RequiredCall` | `Joi.string().required()` | `Joi.string()` |
//! | `SchemaTypeAccess` | `Joi.string` | `z.string` |
//! | `NamespaceReference` | `Joi` | `z` |

use rustc_hash::FxHashSet;
use swc_core::common::Span;
use swc_core::ecma::ast::{
    CallExpr, Callee, ExportSpecifier, Expr, Id, Ident, ImportDecl, ImportNamedSpecifier,
    ImportSpecifier, KeyValueProp, MemberExpr, MemberProp, Module, ModuleDecl, ModuleExportName,
    ModuleItem, NamedExport, PrivateName, Prop, PropName, Str, SuperProp, TsEntityName,
    TsQualifiedName,
};
use swc_core::ecma::visit::{Visit, VisitWith};

use crate::config::MigrationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    SourceImport,
    OptionalCall,
    RequiredCall,
    SchemaTypeAccess,
    NamespaceReference,
}

impl Rule {
    pub const COUNT: usize = 5;

    pub const ALL: [Rule; Rule::COUNT] = [
        Rule::SourceImport,
        Rule::OptionalCall,
        Rule::RequiredCall,
        Rule::SchemaTypeAccess,
        Rule::NamespaceReference,
    ];

    /// Expression rules, most specific first.
    pub const EXPRESSION_PRIORITY: [Rule; 4] = [
        Rule::OptionalCall,
        Rule::RequiredCall,
        Rule::SchemaTypeAccess,
        Rule::NamespaceReference,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::SourceImport => "source-import",
            Rule::OptionalCall => "optional-call",
            Rule::RequiredCall => "required-call",
            Rule::SchemaTypeAccess => "schema-type-access",
            Rule::NamespaceReference => "namespace-reference",
        }
    }

    /// Whether the replacement this rule produces may itself match a rule.
    ///
    /// Unwrapping `.required()` exposes the callee's object, which can be
    /// another modifier call (`.optional().required()`).
    pub fn requeues_replacement(self) -> bool {
        matches!(self, Rule::RequiredCall)
    }
}

/// Per-module namespace bindings.
///
/// `bindings` holds every binding the module's imports give the source library
/// namespace (`Joi` in `import Joi from "joi"`, `J` in
/// `import * as J from "joi"`), keyed by scope-resolved [`Id`]. A nested
/// declaration that shadows one of them has a different syntax context and is
/// left alone. All of them are renamed to `target`.
#[derive(Debug, Clone, Default)]
pub struct Namespaces {
    bindings: FxHashSet<Id>,
    target: String,
    /// Bindings of the target namespace imported from the target module.
    target_imports: FxHashSet<Id>,
    /// The module already imports the target namespace under its own name.
    target_bound: bool,
}

impl Namespaces {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            bindings: FxHashSet::default(),
            target: target.into(),
            target_imports: FxHashSet::default(),
            target_bound: false,
        }
    }

    pub fn bind(&mut self, local: &Ident) {
        self.bindings.insert(local.to_id());
    }

    pub fn is_active(&self) -> bool {
        !self.bindings.is_empty()
    }

    /// Whether `ident` refers to a source namespace binding.
    pub fn is_source(&self, ident: &Ident) -> bool {
        self.bindings.contains(&ident.to_id())
    }

    /// Whether any source namespace binding is named `name`, in any scope.
    pub fn is_source_name(&self, name: &str) -> bool {
        self.bindings.iter().any(|(sym, _)| &**sym == name)
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn target_bound(&self) -> bool {
        self.target_bound
    }

    pub fn mark_target_bound(&mut self) {
        self.target_bound = true;
    }

    /// Whether any of `items` imports a binding named like the target namespace.
    pub fn binds_target(&self, items: &[ModuleItem]) -> bool {
        items.iter().any(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => decl
                .specifiers
                .iter()
                .any(|specifier| *specifier_local(specifier).sym == *self.target),
            _ => false,
        })
    }

    pub fn target_ident(&self, span: Span) -> Ident {
        Ident::new(self.target.as_str().into(), span)
    }

    /// Whether a call/member chain bottoms out at a source namespace binding.
    pub fn roots(&self, expr: &Expr) -> bool {
        match expr {
            Expr::Ident(ident) => self.is_source(ident),
            Expr::Member(member) => self.roots(&member.obj),
            Expr::Call(CallExpr {
                callee: Callee::Expr(callee),
                ..
            }) => self.roots(callee),
            Expr::Paren(paren) => self.roots(&paren.expr),
            _ => false,
        }
    }

    /// Whether `module` declares or references the target name as anything
    /// other than an import of the target namespace. Renaming the source
    /// namespace there would capture or redeclare that binding.
    pub fn target_name_taken(&self, module: &Module) -> bool {
        let mut finder = TargetNameFinder {
            namespaces: self,
            found: false,
        };
        module.visit_with(&mut finder);
        finder.found
    }
}

/// Looks for identifiers named like the target namespace in binding or
/// reference position. Property names, qualified-name members and export
/// names are not bindings and are skipped.
struct TargetNameFinder<'n> {
    namespaces: &'n Namespaces,
    found: bool,
}

impl Visit for TargetNameFinder<'_> {
    fn visit_ident(&mut self, ident: &Ident) {
        if *ident.sym != *self.namespaces.target {
            return;
        }
        let id = ident.to_id();
        if !self.namespaces.target_imports.contains(&id) && !self.namespaces.bindings.contains(&id)
        {
            self.found = true;
        }
    }

    fn visit_member_prop(&mut self, prop: &MemberProp) {
        if let MemberProp::Computed(computed) = prop {
            computed.visit_with(self);
        }
    }

    fn visit_super_prop(&mut self, prop: &SuperProp) {
        if let SuperProp::Computed(computed) = prop {
            computed.visit_with(self);
        }
    }

    fn visit_prop_name(&mut self, name: &PropName) {
        if let PropName::Computed(computed) = name {
            computed.visit_with(self);
        }
    }

    fn visit_ts_qualified_name(&mut self, name: &TsQualifiedName) {
        name.left.visit_with(self);
    }

    fn visit_module_export_name(&mut self, _: &ModuleExportName) {}

    fn visit_private_name(&mut self, _: &PrivateName) {}
}

/// The fixed rule set, parameterized by an immutable [`MigrationConfig`].
#[derive(Debug, Clone)]
pub struct RuleSet {
    config: MigrationConfig,
}

impl RuleSet {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    pub fn is_source_import(&self, decl: &ImportDecl) -> bool {
        self.is_source_module(&decl.src)
    }

    pub fn is_source_module(&self, src: &Str) -> bool {
        *src.value == *self.config.source_module
    }

    /// Whether any top-level import or re-export names the source library.
    pub fn references_source(&self, module: &Module) -> bool {
        module.body.iter().any(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => self.is_source_import(decl),
            ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(NamedExport {
                src: Some(src), ..
            })) => self.is_source_module(src),
            ModuleItem::ModuleDecl(ModuleDecl::ExportAll(export)) => {
                self.is_source_module(&export.src)
            }
            _ => false,
        })
    }

    /// Collect the module's source namespace bindings.
    ///
    /// Imports are hoisted, so this looks at every top-level import before
    /// any other node is visited.
    pub fn namespaces_for(&self, module: &Module) -> Namespaces {
        let mut namespaces = Namespaces::new(self.config.target_namespace.as_str());
        for decl in top_level_imports(module) {
            if self.is_source_import(decl) {
                for specifier in &decl.specifiers {
                    if self.binds_source_namespace(specifier) {
                        namespaces.bind(specifier_local(specifier));
                    }
                }
            } else if *decl.src.value == *self.config.target_module {
                for specifier in &decl.specifiers {
                    let local = specifier_local(specifier);
                    if *local.sym == *self.config.target_namespace {
                        namespaces.target_imports.insert(local.to_id());
                        namespaces.target_bound = true;
                    }
                }
            }
        }
        namespaces
    }

    /// Whether a specifier of a source import binds the library namespace.
    ///
    /// `{ default as Joi }` is the default import spelled as a named one.
    fn binds_source_namespace(&self, specifier: &ImportSpecifier) -> bool {
        match specifier {
            ImportSpecifier::Default(_) | ImportSpecifier::Namespace(_) => true,
            ImportSpecifier::Named(named) => {
                !named.is_type_only && self.names_namespace(imported_name(named))
            }
        }
    }

    /// Whether an exported name of the source module is its namespace.
    fn names_namespace(&self, exported: &str) -> bool {
        exported == "default" || exported == self.config.source_namespace
    }

    /// `SourceImport`: statements that replace a source-library import.
    ///
    /// Returns `None` when the declaration is not a source import or imports
    /// nothing. An empty list removes the declaration; that happens when every
    /// specifier bound the namespace and the module already imports the target
    /// namespace.
    pub fn rewrite_import(
        &self,
        decl: &ImportDecl,
        namespaces: &Namespaces,
    ) -> Option<Vec<ModuleItem>> {
        if !self.is_source_import(decl) || decl.specifiers.is_empty() {
            return None;
        }

        let mut rewritten = decl.clone();
        rewritten.src = Box::new(self.retarget_module_specifier(&decl.src));
        rewritten.specifiers = Vec::with_capacity(decl.specifiers.len());

        let mut binds_target = namespaces.target_bound();
        for specifier in &decl.specifiers {
            if !self.binds_source_namespace(specifier) {
                rewritten.specifiers.push(specifier.clone());
                continue;
            }
            if binds_target {
                continue;
            }
            binds_target = true;
            rewritten
                .specifiers
                .push(ImportSpecifier::Named(ImportNamedSpecifier {
                    span: specifier_local(specifier).span,
                    local: namespaces.target_ident(specifier_local(specifier).span),
                    imported: None,
                    is_type_only: false,
                }));
        }

        if rewritten.specifiers.is_empty() {
            return Some(Vec::new());
        }
        Some(vec![ModuleItem::ModuleDecl(ModuleDecl::Import(rewritten))])
    }

    /// `SourceImport` for a re-export: `export * from "joi"`,
    /// `export { ValidationError } from "joi"`.
    pub fn rewrite_reexport_source(&self, src: &Str) -> Option<Str> {
        if !self.is_source_module(src) {
            return None;
        }
        Some(self.retarget_module_specifier(src))
    }

    /// Re-exported namespace of the source module: `export { default as Joi }
    /// from "joi"` -> `export { z as Joi } from "zod"`.
    pub fn rewrite_reexport_specifier(
        &self,
        specifier: &ExportSpecifier,
    ) -> Option<ExportSpecifier> {
        let ExportSpecifier::Named(named) = specifier else {
            return None;
        };
        if named.is_type_only {
            return None;
        }
        let ModuleExportName::Ident(orig) = &named.orig else {
            return None;
        };
        if !self.names_namespace(&orig.sym) || *orig.sym == *self.config.target_namespace {
            return None;
        }
        let mut rewritten = named.clone();
        rewritten.orig = ModuleExportName::Ident(Ident::new(
            self.config.target_namespace.as_str().into(),
            orig.span,
        ));
        if rewritten.exported.is_none() {
            rewritten.exported = Some(ModuleExportName::Ident(orig.clone()));
        }
        Some(ExportSpecifier::Named(rewritten))
    }

    /// Module specifier string pointing at the target library, keeping the
    /// original quote style.
    fn retarget_module_specifier(&self, src: &Str) -> Str {
        let quote = match src.raw.as_deref().and_then(|raw| raw.chars().next()) {
            Some('\'') => '\'',
            _ => '"',
        };
        let mut retargeted = src.clone();
        retargeted.value = self.config.target_module.as_str().into();
        retargeted.raw = Some(format!("{quote}{}{quote}", self.config.target_module).into());
        retargeted
    }

    /// Try the expression rules in priority order.
    pub fn rewrite_expr(&self, expr: &Expr, namespaces: &Namespaces) -> Option<(Rule, Expr)> {
        if !namespaces.is_active() {
            return None;
        }
        Rule::EXPRESSION_PRIORITY.into_iter().find_map(|rule| {
            self.apply(rule, expr, namespaces)
                .map(|replacement| (rule, replacement))
        })
    }

    /// Apply a single expression rule.
    pub fn apply(&self, rule: Rule, expr: &Expr, namespaces: &Namespaces) -> Option<Expr> {
        match rule {
            Rule::OptionalCall => self.optional_call(expr, namespaces),
            Rule::RequiredCall => self.required_call(expr, namespaces),
            Rule::SchemaTypeAccess => self.schema_type_access(expr, namespaces),
            Rule::NamespaceReference => self.namespace_reference(expr, namespaces),
            Rule::SourceImport => None,
        }
    }

    fn optional_call(&self, expr: &Expr, namespaces: &Namespaces) -> Option<Expr> {
        let Expr::Call(call) = expr else {
            return None;
        };
        let member = modifier_callee(call, "optional")?;
        if !namespaces.roots(&member.obj) {
            return None;
        }
        let mut normalized = call.clone();
        normalized.args.clear();
        Some(Expr::Call(normalized))
    }

    fn required_call(&self, expr: &Expr, namespaces: &Namespaces) -> Option<Expr> {
        let Expr::Call(call) = expr else {
            return None;
        };
        let member = modifier_callee(call, "required")?;
        if !namespaces.roots(&member.obj) {
            return None;
        }
        Some((*member.obj).clone())
    }

    fn schema_type_access(&self, expr: &Expr, namespaces: &Namespaces) -> Option<Expr> {
        let Expr::Member(member) = expr else {
            return None;
        };
        let Expr::Ident(object) = &*member.obj else {
            return None;
        };
        if !namespaces.is_source(object) {
            return None;
        }
        let MemberProp::Ident(prop) = &member.prop else {
            return None;
        };
        let mapped = self.config.map_schema_type(&prop.sym)?;

        let mut rewritten = member.clone();
        rewritten.obj = Box::new(Expr::Ident(namespaces.target_ident(object.span)));
        rewritten.prop = MemberProp::Ident(Ident::new(mapped.into(), prop.span));
        Some(Expr::Member(rewritten))
    }

    fn namespace_reference(&self, expr: &Expr, namespaces: &Namespaces) -> Option<Expr> {
        let Expr::Ident(ident) = expr else {
            return None;
        };
        if !namespaces.is_source(ident) {
            return None;
        }
        Some(Expr::Ident(namespaces.target_ident(ident.span)))
    }

    /// `NamespaceReference` in type position: `Joi.ObjectSchema`, `typeof Joi`.
    pub fn rewrite_entity_name(
        &self,
        name: &TsEntityName,
        namespaces: &Namespaces,
    ) -> Option<TsEntityName> {
        match name {
            TsEntityName::Ident(ident) if namespaces.is_source(ident) => {
                Some(TsEntityName::Ident(namespaces.target_ident(ident.span)))
            }
            _ => None,
        }
    }

    /// `NamespaceReference` in a shorthand property: `{ Joi }` -> `{ Joi: z }`.
    pub fn rewrite_prop(&self, prop: &Prop, namespaces: &Namespaces) -> Option<Prop> {
        match prop {
            Prop::Shorthand(ident) if namespaces.is_source(ident) => {
                Some(Prop::KeyValue(KeyValueProp {
                    key: PropName::Ident(ident.clone()),
                    value: Box::new(Expr::Ident(namespaces.target_ident(ident.span))),
                }))
            }
            _ => None,
        }
    }

    /// `NamespaceReference` in a local export: `export { Joi }` ->
    /// `export { z as Joi }`.
    ///
    /// Export lists only name module-scope bindings, so this matches by name.
    pub fn rewrite_export_specifier(
        &self,
        specifier: &ExportSpecifier,
        namespaces: &Namespaces,
    ) -> Option<ExportSpecifier> {
        let ExportSpecifier::Named(named) = specifier else {
            return None;
        };
        let ModuleExportName::Ident(orig) = &named.orig else {
            return None;
        };
        if !namespaces.is_source_name(&orig.sym) {
            return None;
        }
        let mut rewritten = named.clone();
        rewritten.orig = ModuleExportName::Ident(namespaces.target_ident(orig.span));
        if rewritten.exported.is_none() {
            rewritten.exported = Some(ModuleExportName::Ident(orig.clone()));
        }
        Some(ExportSpecifier::Named(rewritten))
    }
}

fn top_level_imports(module: &Module) -> impl Iterator<Item = &ImportDecl> {
    module.body.iter().filter_map(|item| match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => Some(decl),
        _ => None,
    })
}

fn specifier_local(specifier: &ImportSpecifier) -> &Ident {
    match specifier {
        ImportSpecifier::Named(named) => &named.local,
        ImportSpecifier::Default(default) => &default.local,
        ImportSpecifier::Namespace(namespace) => &namespace.local,
    }
}

fn imported_name(named: &ImportNamedSpecifier) -> &str {
    match &named.imported {
        Some(ModuleExportName::Ident(ident)) => &*ident.sym,
        Some(ModuleExportName::Str(name)) => &*name.value,
        None => &*named.local.sym,
    }
}

/// The member callee of `<object>.<name>(...)`.
fn modifier_callee<'e>(call: &'e CallExpr, name: &str) -> Option<&'e MemberExpr> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = &**callee else {
        return None;
    };
    match &member.prop {
        MemberProp::Ident(prop) if *prop.sym == *name => Some(member),
        _ => None,
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
