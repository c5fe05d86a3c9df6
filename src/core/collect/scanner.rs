use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;
use swc_common::SourceMap;

use crate::core::{
    collect::{
        text_collector::collect_texts,
        types::{CandidateTokens, ModuleRecord, ScanResult},
    },
    extract::Extractor,
    parsers::module::parse_module_source,
};

/// Phase 1: harvest candidate tokens from every included module.
///
/// Modules are parsed and walked in parallel; each worker returns its own
/// token list and the lists are merged sequentially afterwards. A module that
/// fails to parse aborts the whole scan.
pub fn scan_modules(modules: &[ModuleRecord], extractor: &dyn Extractor) -> Result<ScanResult> {
    let (scannable, skipped): (Vec<&ModuleRecord>, Vec<&ModuleRecord>) =
        modules.iter().partition(|m| m.is_scannable());

    let per_module: Vec<Result<Vec<String>>> = scannable
        .par_iter()
        .map(|module| {
            let code = module.code.clone().unwrap_or_default();
            // Each module gets its own SourceMap
            let source_map = Arc::new(SourceMap::default());
            let ast = parse_module_source(code, &module.id, source_map)?;
            Ok(collect_texts(&ast)
                .iter()
                .flat_map(|text| extractor.extract(text))
                .collect())
        })
        .collect();

    let mut tokens = CandidateTokens::new();
    for result in per_module {
        tokens.extend(result?);
    }

    Ok(ScanResult {
        tokens,
        scanned: scannable.len(),
        skipped: skipped.len(),
    })
}
