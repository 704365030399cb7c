//! Parser and generator adapters.
//!
//! Both directions go through `swc`. A [`ParsedModule`] keeps the source map
//! and comment table the parser filled so the generator can put comments back
//! where they were and report positions against the original text.

use std::path::Path;

use swc_core::common::comments::{Comments, SingleThreadedComments};
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, Mark, SourceMap, Spanned};
use swc_core::ecma::ast::{EsVersion, Module};
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::{Config, Emitter};
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{Parser, StringInput, Syntax, TsConfig};
use swc_core::ecma::transforms::base::resolver;
use swc_core::ecma::visit::VisitMutWith;

use crate::error::TransformError;

/// A module together with the state needed to print it again.
pub struct ParsedModule {
    pub module: Module,
    file_name: String,
    source_map: Lrc<SourceMap>,
    comments: SingleThreadedComments,
}

impl ParsedModule {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Parser syntax for a file, chosen by extension.
fn syntax_for(file_name: &Path) -> Syntax {
    let tsx = file_name
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tsx"));
    Syntax::Typescript(TsConfig {
        tsx,
        decorators: true,
        ..Default::default()
    })
}

/// Parse TypeScript source into a module.
///
/// Errors the parser recovered from are treated the same as fatal ones: a
/// module that did not parse cleanly is never rewritten.
pub fn parse_module(source: &str, file_name: &Path) -> Result<ParsedModule, TransformError> {
    let display_name = file_name.display().to_string();
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file =
        source_map.new_source_file(FileName::Custom(display_name.clone()), source.to_string());
    let comments = SingleThreadedComments::default();

    let result = {
        let comments_ref: &dyn Comments = &comments;
        let lexer = Lexer::new(
            syntax_for(file_name),
            EsVersion::latest(),
            StringInput::from(&*source_file),
            Some(comments_ref),
        );
        let mut parser = Parser::new_from(lexer);
        let module = parser.parse_module();
        let recovered = parser.take_errors();
        match module {
            Ok(module) => match recovered.into_iter().next() {
                Some(err) => Err(err),
                None => Ok(module),
            },
            Err(err) => Err(err),
        }
    };

    match result {
        Ok(module) => Ok(ParsedModule {
            module,
            file_name: display_name,
            source_map,
            comments,
        }),
        Err(err) => {
            let loc = source_map.lookup_char_pos(err.span().lo);
            Err(TransformError::Syntax {
                file: display_name,
                line: loc.line,
                column: loc.col_display + 1,
                message: err.kind().msg().to_string(),
            })
        }
    }
}

/// Give every identifier the syntax context of the scope that binds it, so
/// that `Ident::to_id` tells a shadowing declaration apart from the binding
/// it shadows. Only contexts change; printed text does not.
///
/// Must run inside `swc_core::common::GLOBALS`.
pub fn resolve_bindings(module: &mut Module) {
    let unresolved_mark = Mark::new();
    let top_level_mark = Mark::new();
    module.visit_mut_with(&mut resolver(unresolved_mark, top_level_mark, true));
}

/// Print a module back to source text.
pub fn emit_module(parsed: &ParsedModule) -> Result<String, TransformError> {
    let mut buf = Vec::new();
    {
        let comments_ref: &dyn Comments = &parsed.comments;
        let writer = JsWriter::new(parsed.source_map.clone(), "\n", &mut buf, None);
        let mut emitter = Emitter {
            cfg: Config::default(),
            cm: parsed.source_map.clone(),
            comments: Some(comments_ref),
            wr: writer,
        };
        emitter
            .emit_module(&parsed.module)
            .map_err(|source| TransformError::Generate {
                file: parsed.file_name.clone(),
                source,
            })?;
    }
    String::from_utf8(buf).map_err(|source| TransformError::Utf8 {
        file: parsed.file_name.clone(),
        source,
    })
}
