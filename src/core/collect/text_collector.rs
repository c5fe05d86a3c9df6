//! AST visitor that harvests every piece of selector-like text from a module.
//!
//! Three node categories feed the extractor:
//! - string literals (including JSX attribute values)
//! - identifiers and property names
//! - template segments (cooked value, raw as fallback)
//!
//! JSX text children are collected as well since markup text routinely
//! carries class names in component libraries.

use swc_ecma_ast::{Ident, IdentName, JSXText, Module, PrivateName, Str, TplElement};
use swc_ecma_visit::{Visit, VisitWith};

/// Walk the whole module and return every harvested text fragment in source order.
pub fn collect_texts(module: &Module) -> Vec<String> {
    let mut collector = TextCollector::default();
    module.visit_with(&mut collector);
    collector.texts
}

#[derive(Debug, Default)]
struct TextCollector {
    texts: Vec<String>,
}

impl TextCollector {
    fn push(&mut self, text: &str) {
        if !text.is_empty() {
            self.texts.push(text.to_string());
        }
    }
}

impl Visit for TextCollector {
    fn visit_str(&mut self, node: &Str) {
        // Lone surrogates can't spell a selector
        if let Some(value) = node.value.as_str() {
            self.push(value);
        }
    }

    fn visit_ident(&mut self, node: &Ident) {
        self.push(node.sym.as_str());
    }

    fn visit_ident_name(&mut self, node: &IdentName) {
        self.push(node.sym.as_str());
    }

    fn visit_private_name(&mut self, node: &PrivateName) {
        self.push(node.name.as_str());
    }

    fn visit_tpl_element(&mut self, node: &TplElement) {
        match node.cooked.as_ref().and_then(|cooked| cooked.as_str()) {
            Some(cooked) => self.push(cooked),
            None => self.push(node.raw.as_str()),
        }
    }

    fn visit_jsx_text(&mut self, node: &JSXText) {
        self.push(node.value.as_str());
    }
}
