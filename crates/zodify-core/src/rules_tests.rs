use super::*;
use crate::syntax::parse_module;
use std::path::Path;
use swc_core::common::{DUMMY_SP, GLOBALS, Globals, Mark, SyntaxContext};
use swc_core::ecma::ast::{ExprStmt, Lit, Stmt};

fn parse(source: &str) -> Module {
    parse_module(source, Path::new("test.ts"))
        .expect("test source should parse")
        .module
}

/// First expression statement of `source`.
fn expr(source: &str) -> Expr {
    for item in parse(source).body {
        if let ModuleItem::Stmt(Stmt::Expr(ExprStmt { expr, .. })) = item {
            return *expr;
        }
    }
    panic!("no expression statement in {source:?}");
}

/// Compact rendering of call/member chains, enough to compare rule output.
fn render(expr: &Expr) -> String {
    match expr {
        Expr::Ident(ident) => ident.sym.to_string(),
        Expr::Member(member) => match &member.prop {
            MemberProp::Ident(prop) => format!("{}.{}", render(&member.obj), prop.sym),
            _ => format!("{}[?]", render(&member.obj)),
        },
        Expr::Call(call) => {
            let callee = match &call.callee {
                Callee::Expr(callee) => render(callee),
                _ => "?".to_string(),
            };
            let args: Vec<String> = call.args.iter().map(|arg| render(&arg.expr)).collect();
            format!("{callee}({})", args.join(", "))
        }
        Expr::Lit(Lit::Str(s)) => format!("{:?}", &*s.value),
        Expr::Lit(Lit::Num(n)) => n.value.to_string(),
        Expr::Paren(paren) => format!("({})", render(&paren.expr)),
        _ => "?".to_string(),
    }
}

fn joi_namespaces() -> Namespaces {
    let mut namespaces = Namespaces::new("z");
    namespaces.bind(&Ident::new("Joi".into(), DUMMY_SP));
    namespaces
}

fn rules() -> RuleSet {
    RuleSet::new(MigrationConfig::default())
}

fn first_import(module: &Module) -> &ImportDecl {
    top_level_imports(module)
        .next()
        .expect("test source should contain an import")
}

fn import_summary(items: &[ModuleItem]) -> Vec<(String, Vec<String>)> {
    items
        .iter()
        .map(|item| match item {
            ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => (
                decl.src.value.to_string(),
                decl.specifiers
                    .iter()
                    .map(|s| match s {
                        ImportSpecifier::Named(named) => match &named.imported {
                            Some(imported) => format!(
                                "{{{} as {}}}",
                                match imported {
                                    ModuleExportName::Ident(i) => i.sym.to_string(),
                                    ModuleExportName::Str(s) => s.value.to_string(),
                                },
                                named.local.sym
                            ),
                            None => format!("{{{}}}", named.local.sym),
                        },
                        ImportSpecifier::Default(default) => default.local.sym.to_string(),
                        ImportSpecifier::Namespace(ns) => format!("* as {}", ns.local.sym),
                    })
                    .collect(),
            ),
            _ => panic!("expected an import declaration"),
        })
        .collect()
}

// =============================================================================
// Namespaces
// =============================================================================

#[test]
fn test_namespaces_from_default_import() {
    let module = parse("import Joi from \"joi\";");
    let namespaces = rules().namespaces_for(&module);
    assert!(namespaces.is_active());
    assert!(namespaces.is_source_name("Joi"));
    assert_eq!(namespaces.target(), "z");
    assert!(!namespaces.target_bound());
}

#[test]
fn test_namespaces_from_namespace_and_aliased_imports() {
    let module = parse("import * as J from 'joi';");
    assert!(rules().namespaces_for(&module).is_source_name("J"));

    let module = parse("import { Joi as Validator } from 'joi';");
    let namespaces = rules().namespaces_for(&module);
    assert!(namespaces.is_source_name("Validator"));
    assert!(!namespaces.is_source_name("Joi"));
}

#[test]
fn test_namespaces_ignore_other_named_imports() {
    let module = parse("import { ValidationError } from 'joi';");
    let namespaces = rules().namespaces_for(&module);
    assert!(!namespaces.is_active());
    assert!(rules().references_source(&module));
}

#[test]
fn test_namespaces_without_source_import() {
    let module = parse("import { z } from 'zod';\nconst s = Joi.string();");
    let namespaces = rules().namespaces_for(&module);
    assert!(!namespaces.is_active());
    assert!(namespaces.target_bound());
    assert!(!rules().references_source(&module));
}

#[test]
fn test_namespaces_from_default_spelled_as_named_import() {
    let module = parse("import { default as Joi } from 'joi';");
    let namespaces = rules().namespaces_for(&module);
    assert!(namespaces.is_source_name("Joi"));
    let items = rules()
        .rewrite_import(first_import(&module), &namespaces)
        .unwrap();
    assert_eq!(
        import_summary(&items),
        vec![("zod".to_string(), vec!["{z}".to_string()])]
    );
}

#[test]
fn test_is_source_tells_shadowing_binding_apart() {
    GLOBALS.set(&Globals::new(), || {
        let namespaces = joi_namespaces();
        let nested = SyntaxContext::empty().apply_mark(Mark::new());
        let shadow = Ident::new("Joi".into(), DUMMY_SP.with_ctxt(nested));
        assert!(namespaces.is_source(&Ident::new("Joi".into(), DUMMY_SP)));
        assert!(!namespaces.is_source(&shadow));
        assert!(namespaces.is_source_name("Joi"));
        assert!(!namespaces.roots(&Expr::Ident(shadow)));
    });
}

#[test]
fn test_references_source_through_reexports() {
    assert!(rules().references_source(&parse("export * from 'joi';")));
    assert!(rules().references_source(&parse("export { ValidationError } from 'joi';")));
    assert!(!rules().references_source(&parse("export { ValidationError } from 'yup';")));
}

#[test]
fn test_target_name_taken() {
    let module = parse("import Joi from 'joi';\nconst z = 1;");
    assert!(rules().namespaces_for(&module).target_name_taken(&module));

    let module = parse("import Joi from 'joi';\nimport { z } from 'zod';\nz.string();");
    assert!(!rules().namespaces_for(&module).target_name_taken(&module));

    // Property names and qualified-name members are not bindings.
    let module = parse(
        "import Joi from 'joi';\nconst o = { z: 1 };\no.z;\nclass C { z = 1; #z = 2; }\nlet t: A.z;",
    );
    assert!(!rules().namespaces_for(&module).target_name_taken(&module));
}

#[test]
fn test_reexport_source_and_specifiers() {
    let rules = rules();
    let retargeted = rules
        .rewrite_reexport_source(&Str::from("joi"))
        .unwrap();
    assert_eq!(&*retargeted.value, "zod");
    assert!(rules.rewrite_reexport_source(&Str::from("yup")).is_none());

    let module = parse("export { default as Joi, ValidationError } from 'joi';");
    let ModuleItem::ModuleDecl(ModuleDecl::ExportNamed(export)) = &module.body[0] else {
        panic!("expected a named re-export");
    };
    let renamed = rules
        .rewrite_reexport_specifier(&export.specifiers[0])
        .unwrap();
    let ExportSpecifier::Named(named) = renamed else {
        panic!("expected a named specifier");
    };
    assert!(matches!(&named.orig, ModuleExportName::Ident(orig) if &*orig.sym == "z"));
    assert!(
        matches!(&named.exported, Some(ModuleExportName::Ident(name)) if &*name.sym == "Joi")
    );
    assert!(
        rules
            .rewrite_reexport_specifier(&export.specifiers[1])
            .is_none()
    );
}

#[test]
fn test_roots_follow_calls_members_and_parens() {
    let namespaces = joi_namespaces();
    assert!(namespaces.roots(&expr("Joi.string().min(1).max(3);")));
    assert!(namespaces.roots(&expr("(Joi.number()).integer();")));
    assert!(!namespaces.roots(&expr("foo.string().min(1);")));
    assert!(!namespaces.roots(&expr("make(Joi).string();")));
}

// =============================================================================
// SourceImport
// =============================================================================

#[test]
fn test_default_import_becomes_named_target_import() {
    let module = parse("import Joi from \"joi\";");
    let namespaces = rules().namespaces_for(&module);
    let items = rules()
        .rewrite_import(first_import(&module), &namespaces)
        .unwrap();
    assert_eq!(
        import_summary(&items),
        vec![("zod".to_string(), vec!["{z}".to_string()])]
    );
}

#[test]
fn test_named_import_of_namespace_is_renamed() {
    let module = parse("import { Joi } from 'joi';");
    let namespaces = rules().namespaces_for(&module);
    let items = rules()
        .rewrite_import(first_import(&module), &namespaces)
        .unwrap();
    assert_eq!(
        import_summary(&items),
        vec![("zod".to_string(), vec!["{z}".to_string()])]
    );
}

#[test]
fn test_other_specifiers_are_kept() {
    let module = parse("import Joi, { ValidationError as VE } from 'joi';");
    let namespaces = rules().namespaces_for(&module);
    let items = rules()
        .rewrite_import(first_import(&module), &namespaces)
        .unwrap();
    assert_eq!(
        import_summary(&items),
        vec![(
            "zod".to_string(),
            vec!["{z}".to_string(), "{ValidationError as VE}".to_string()]
        )]
    );
}

#[test]
fn test_import_keeps_quote_style() {
    let module = parse("import Joi from 'joi';");
    let namespaces = rules().namespaces_for(&module);
    let items = rules()
        .rewrite_import(first_import(&module), &namespaces)
        .unwrap();
    let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = &items[0] else {
        panic!("expected an import");
    };
    assert_eq!(decl.src.raw.as_deref(), Some("'zod'"));
}

#[test]
fn test_import_dropped_when_target_already_bound() {
    let module = parse("import { z } from 'zod';\nimport Joi from 'joi';");
    let namespaces = rules().namespaces_for(&module);
    let decl = top_level_imports(&module).nth(1).unwrap();
    let items = rules().rewrite_import(decl, &namespaces).unwrap();
    assert!(items.is_empty());
}

#[test]
fn test_side_effect_import_is_left_alone() {
    let module = parse("import 'joi';");
    let namespaces = rules().namespaces_for(&module);
    assert!(
        rules()
            .rewrite_import(first_import(&module), &namespaces)
            .is_none()
    );
}

#[test]
fn test_unrelated_import_is_left_alone() {
    let module = parse("import yup from 'yup';");
    let namespaces = rules().namespaces_for(&module);
    assert!(
        rules()
            .rewrite_import(first_import(&module), &namespaces)
            .is_none()
    );
}

#[test]
fn test_binds_target() {
    let namespaces = joi_namespaces();
    let module = parse("import { z } from 'zod';");
    assert!(namespaces.binds_target(&module.body));
    let module = parse("import { ValidationError } from 'zod';");
    assert!(!namespaces.binds_target(&module.body));
}

// =============================================================================
// Expression rules
// =============================================================================

#[test]
fn test_schema_type_access_for_every_default_type() {
    let rules = rules();
    let namespaces = joi_namespaces();
    for ty in ["string", "number", "boolean", "object", "array", "date"] {
        let source = format!("Joi.{ty};");
        let rewritten = rules
            .apply(Rule::SchemaTypeAccess, &expr(&source), &namespaces)
            .unwrap();
        assert_eq!(render(&rewritten), format!("z.{ty}"));
    }
}

#[test]
fn test_schema_type_access_uses_rename_table() {
    let mut config = MigrationConfig::default();
    config
        .schema_types
        .insert("alternatives".to_string(), "union".to_string());
    let rules = RuleSet::new(config);
    let rewritten = rules
        .apply(
            Rule::SchemaTypeAccess,
            &expr("Joi.alternatives;"),
            &joi_namespaces(),
        )
        .unwrap();
    assert_eq!(render(&rewritten), "z.union");
}

#[test]
fn test_schema_type_access_skips_unknown_property() {
    assert!(
        rules()
            .apply(Rule::SchemaTypeAccess, &expr("Joi.any;"), &joi_namespaces())
            .is_none()
    );
}

#[test]
fn test_required_call_unwraps_one_layer() {
    let rewritten = rules()
        .apply(
            Rule::RequiredCall,
            &expr("Joi.string().min(2).required();"),
            &joi_namespaces(),
        )
        .unwrap();
    assert_eq!(render(&rewritten), "Joi.string().min(2)");
}

#[test]
fn test_required_call_ignores_unrelated_chain() {
    assert!(
        rules()
            .apply(
                Rule::RequiredCall,
                &expr("form.field().required();"),
                &joi_namespaces()
            )
            .is_none()
    );
}

#[test]
fn test_optional_call_drops_arguments() {
    let rewritten = rules()
        .apply(
            Rule::OptionalCall,
            &expr("Joi.string().optional('x', 2);"),
            &joi_namespaces(),
        )
        .unwrap();
    assert_eq!(render(&rewritten), "Joi.string().optional()");
}

#[test]
fn test_optional_call_ignores_unrelated_chain() {
    assert!(
        rules()
            .apply(Rule::OptionalCall, &expr("foo.optional(1);"), &joi_namespaces())
            .is_none()
    );
}

#[test]
fn test_namespace_reference() {
    let rewritten = rules()
        .apply(Rule::NamespaceReference, &expr("Joi;"), &joi_namespaces())
        .unwrap();
    assert_eq!(render(&rewritten), "z");
    assert!(
        rules()
            .apply(Rule::NamespaceReference, &expr("Yup;"), &joi_namespaces())
            .is_none()
    );
}

#[test]
fn test_rewrite_expr_priority() {
    let rules = rules();
    let namespaces = joi_namespaces();

    let (rule, _) = rules
        .rewrite_expr(&expr("Joi.string().optional().required();"), &namespaces)
        .unwrap();
    assert_eq!(rule, Rule::RequiredCall);

    let (rule, _) = rules
        .rewrite_expr(&expr("Joi.string().required().optional();"), &namespaces)
        .unwrap();
    assert_eq!(rule, Rule::OptionalCall);

    let (rule, _) = rules.rewrite_expr(&expr("Joi.date;"), &namespaces).unwrap();
    assert_eq!(rule, Rule::SchemaTypeAccess);

    assert!(rules.rewrite_expr(&expr("Joi.string();"), &namespaces).is_none());
}

#[test]
fn test_rewrite_expr_inactive_without_bindings() {
    let namespaces = Namespaces::new("z");
    assert!(
        rules()
            .rewrite_expr(&expr("Joi.string().required();"), &namespaces)
            .is_none()
    );
}

#[test]
fn test_only_required_requeues() {
    for rule in Rule::ALL {
        assert_eq!(rule.requeues_replacement(), rule == Rule::RequiredCall);
    }
}

// =============================================================================
// Reference rewrites outside expressions
// =============================================================================

#[test]
fn test_shorthand_property_is_expanded() {
    let ident = Ident::new("Joi".into(), DUMMY_SP);
    let rewritten = rules()
        .rewrite_prop(&Prop::Shorthand(ident), &joi_namespaces())
        .unwrap();
    let Prop::KeyValue(kv) = rewritten else {
        panic!("expected a key-value property");
    };
    assert!(matches!(&kv.key, PropName::Ident(key) if &*key.sym == "Joi"));
    assert_eq!(render(&kv.value), "z");
}

#[test]
fn test_entity_name_root_is_renamed() {
    let name = TsEntityName::Ident(Ident::new("Joi".into(), DUMMY_SP));
    let rewritten = rules()
        .rewrite_entity_name(&name, &joi_namespaces())
        .unwrap();
    assert!(matches!(rewritten, TsEntityName::Ident(ident) if &*ident.sym == "z"));
}
