use anyhow::{Result, anyhow};
use std::path::Path;
use std::sync::Arc;
use swc_common::{FileName, Globals, SourceMap};
use swc_ecma_ast::Module;
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

/// Pick the parser syntax from a module id's extension.
///
/// `.tsx` gets TSX, other TypeScript extensions get plain TypeScript so that
/// `<T>expr` casts parse, and everything else is treated as ECMAScript with JSX.
pub fn syntax_for(module_id: &str) -> Syntax {
    let extension = Path::new(strip_query(module_id))
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extension {
        "tsx" => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        "ts" | "mts" | "cts" => Syntax::Typescript(TsSyntax::default()),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
    }
}

/// Strip a bundler query suffix (`?inline`, `?v=123`) from a module id.
pub fn strip_query(module_id: &str) -> &str {
    module_id.split('?').next().unwrap_or(module_id)
}

/// Parse a module's final text into an AST.
///
/// Accepts a shared SourceMap for thread-safe parallel parsing.
pub fn parse_module_source(
    code: String,
    module_id: &str,
    source_map: Arc<SourceMap>,
) -> Result<Module> {
    use swc_common::GLOBALS;

    // Wrap in GLOBALS.set() for thread safety
    GLOBALS.set(&Globals::new(), || {
        let source_file =
            source_map.new_source_file(FileName::Real(module_id.into()).into(), code);

        let mut parser = Parser::new(
            syntax_for(module_id),
            StringInput::from(&*source_file),
            None,
        );

        let module = parser
            .parse_module()
            .map_err(|e| anyhow!("Failed to parse module '{}': {:?}", module_id, e.kind()))?;

        Ok(module)
    })
}
