//! Purge orchestration: hand every CSS asset to a purge engine and swap in
//! the result.
//!
//! Engines run in parallel over a read-only safelist; replacements are then
//! applied one asset at a time, so a bundle never sees concurrent writes.

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::{Map, Value};

use super::host::{OutputBundle, OutputFile};
use super::safelist::Safelist;

/// Engine options, minus the keys the orchestrator owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOptions {
    /// Remove `@keyframes` no kept rule animates with.
    pub keyframes: bool,
    /// Remove `@font-face` whose family no kept rule uses.
    pub font_face: bool,
    /// Every other option, untouched.
    pub extra: Map<String, Value>,
}

impl EngineOptions {
    /// Build from passthrough options; non-boolean flags count as off.
    pub fn from_map(mut map: Map<String, Value>) -> Self {
        let keyframes = map
            .remove("keyframes")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let font_face = map
            .remove("fontFace")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Self {
            keyframes,
            font_face,
            extra: map,
        }
    }
}

/// One engine invocation.
#[derive(Debug, Clone, Copy)]
pub struct PurgeRequest<'a> {
    pub file_name: &'a str,
    /// Raw asset text, whitespace-trimmed.
    pub css: &'a str,
    /// Content globs whose files decide which selectors are used.
    pub content: &'a [String],
    pub safelist: &'a Safelist,
    pub options: &'a EngineOptions,
    /// Report rejected selectors.
    pub rejected: bool,
    /// Report the removed CSS text.
    pub rejected_css: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PurgeResult {
    pub css: String,
    pub rejected: Vec<String>,
    pub rejected_css: String,
}

/// Removes unused rules from one stylesheet.
///
/// `Ok(None)` means "no result": the asset stays as it is.
pub trait PurgeEngine: Send + Sync {
    fn purge(&self, request: &PurgeRequest<'_>) -> Result<Option<PurgeResult>>;
}

/// Everything shared by the requests of one purge pass.
#[derive(Debug, Clone)]
pub struct PurgeSettings {
    pub content: Vec<String>,
    pub safelist: Safelist,
    pub options: EngineOptions,
}

impl PurgeSettings {
    fn request<'a>(&'a self, file_name: &'a str, css: &'a str) -> PurgeRequest<'a> {
        PurgeRequest {
            file_name,
            css,
            content: &self.content,
            safelist: &self.safelist,
            options: &self.options,
            rejected: true,
            rejected_css: true,
        }
    }
}

/// What happened to one CSS asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOutcome {
    pub file_name: String,
    pub original_size: usize,
    /// `None` when the engine produced no result.
    pub result: Option<PurgeResult>,
}

impl AssetOutcome {
    pub fn is_changed(&self) -> bool {
        self.result.is_some()
    }

    /// Size after the pass; the original size when untouched.
    pub fn final_size(&self) -> usize {
        self.result
            .as_ref()
            .map_or(self.original_size, |r| r.css.len())
    }

    pub fn rejected(&self) -> &[String] {
        self.result
            .as_ref()
            .map(|r| r.rejected.as_slice())
            .unwrap_or_default()
    }
}

/// Only assets named `*.css` are purge candidates; chunks never are.
pub fn is_css_asset(file: &OutputFile) -> bool {
    matches!(file, OutputFile::Asset(asset) if asset.file_name.ends_with(".css"))
}

/// Purge every CSS asset in `bundle`, in bundle order.
///
/// Assets that are not valid UTF-8 are skipped: they get no outcome and are
/// never rewritten.
pub fn purge_assets(
    bundle: &mut dyn OutputBundle,
    engine: &dyn PurgeEngine,
    settings: &PurgeSettings,
) -> Result<Vec<AssetOutcome>> {
    let stylesheets: Vec<(String, String)> = bundle
        .files()
        .into_iter()
        .filter(is_css_asset)
        .filter_map(|file| match file {
            OutputFile::Asset(asset) => {
                let text = asset.utf8_text()?.to_string();
                Some((asset.file_name, text))
            }
            OutputFile::Chunk(_) => None,
        })
        .collect();

    let results: Vec<Result<AssetOutcome>> = stylesheets
        .par_iter()
        .map(|(file_name, text)| {
            let request = settings.request(file_name, text.trim());
            let result = engine
                .purge(&request)
                .with_context(|| format!("Failed to purge asset '{}'", file_name))?;
            Ok(AssetOutcome {
                file_name: file_name.clone(),
                original_size: text.len(),
                result,
            })
        })
        .collect();

    let mut outcomes = Vec::with_capacity(results.len());
    for outcome in results {
        let outcome = outcome?;
        if let Some(result) = &outcome.result {
            bundle.replace_asset(&outcome.file_name, result.css.clone())?;
        }
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::bail;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::core::host::{AssetFile, BundleFile, MemoryBundle};

    /// Drops every rule mentioning `.unused`, and records what it saw.
    #[derive(Default)]
    struct DropUnused {
        seen: Mutex<Vec<(String, String, bool, bool)>>,
    }

    impl PurgeEngine for DropUnused {
        fn purge(&self, request: &PurgeRequest<'_>) -> Result<Option<PurgeResult>> {
            self.seen.lock().unwrap().push((
                request.file_name.to_string(),
                request.css.to_string(),
                request.rejected,
                request.rejected_css,
            ));
            if !request.css.contains(".unused") {
                return Ok(None);
            }
            Ok(Some(PurgeResult {
                css: request.css.replace(".unused{}", ""),
                rejected: vec![".unused".to_string()],
                rejected_css: ".unused{}".to_string(),
            }))
        }
    }

    struct Failing;

    impl PurgeEngine for Failing {
        fn purge(&self, _request: &PurgeRequest<'_>) -> Result<Option<PurgeResult>> {
            bail!("engine exploded")
        }
    }

    fn settings() -> PurgeSettings {
        PurgeSettings {
            content: vec!["/root/**/*.html".to_string()],
            safelist: Safelist::baseline(),
            options: EngineOptions::default(),
        }
    }

    #[test]
    fn test_only_css_assets_are_purged() {
        let mut bundle = MemoryBundle::new()
            .with_asset("a.css", "  .used{}.unused{}\n")
            .with_asset("logo.svg", "<svg class=\"unused\"/>.unused{}")
            .with_chunk("b.css", ".unused{}")
            .with_chunk("app.js", "const c = '.unused{}'");
        let engine = DropUnused::default();

        let outcomes = purge_assets(&mut bundle, &engine, &settings()).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].file_name, "a.css");
        assert_eq!(outcomes[0].original_size, 19);
        assert_eq!(outcomes[0].final_size(), 7);
        assert_eq!(outcomes[0].rejected(), &[".unused".to_string()]);

        assert_eq!(bundle.asset_text("a.css").as_deref(), Some(".used{}"));
        assert_eq!(
            bundle.asset_text("logo.svg").as_deref(),
            Some("<svg class=\"unused\"/>.unused{}")
        );
        assert!(matches!(bundle.get("b.css"), Some(OutputFile::Chunk(c)) if c.code == ".unused{}"));
    }

    #[test]
    fn test_non_utf8_assets_are_left_untouched() {
        let mut bundle = MemoryBundle::new().with_asset("ok.css", ".unused{}.b{}");
        bundle
            .emit_asset(AssetFile::new(
                "latin1.css",
                b".unused{content:\"\xe9\"}.b{}".to_vec(),
            ))
            .unwrap();
        let before = bundle.get("latin1.css").cloned();
        let engine = DropUnused::default();

        let outcomes = purge_assets(&mut bundle, &engine, &settings()).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].file_name, "ok.css");
        assert_eq!(bundle.asset_text("ok.css").as_deref(), Some(".b{}"));
        assert_eq!(bundle.get("latin1.css").cloned(), before);
        assert_eq!(engine.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_engine_sees_trimmed_css_and_forced_flags() {
        let mut bundle = MemoryBundle::new().with_asset("a.css", "\n\t.a{}  ");
        let engine = DropUnused::default();

        purge_assets(&mut bundle, &engine, &settings()).unwrap();

        let seen = engine.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[("a.css".to_string(), ".a{}".to_string(), true, true)]
        );
    }

    #[test]
    fn test_no_result_leaves_asset_untouched() {
        let mut bundle = MemoryBundle::new().with_asset("a.css", "  .a{}  ");
        let before = bundle.clone();

        let outcomes = purge_assets(&mut bundle, &DropUnused::default(), &settings()).unwrap();

        assert!(!outcomes[0].is_changed());
        assert_eq!(outcomes[0].final_size(), 8);
        assert_eq!(bundle, before);
    }

    #[test]
    fn test_replacement_keeps_asset_metadata() {
        let mut bundle = MemoryBundle::new();
        bundle
            .emit_asset(AssetFile {
                file_name: "assets/index-abc.css".to_string(),
                name: Some("index.css".to_string()),
                original_file_name: Some("src/index.css".to_string()),
                need_code_reference: true,
                source: b".unused{}.b{}".to_vec(),
            })
            .unwrap();

        purge_assets(&mut bundle, &DropUnused::default(), &settings()).unwrap();

        let Some(OutputFile::Asset(asset)) = bundle.get("assets/index-abc.css") else {
            panic!("asset missing");
        };
        assert_eq!(asset.file_name(), "assets/index-abc.css");
        assert_eq!(asset.name.as_deref(), Some("index.css"));
        assert_eq!(asset.original_file_name.as_deref(), Some("src/index.css"));
        assert!(asset.need_code_reference);
        assert_eq!(asset.text(), ".b{}");
    }

    #[test]
    fn test_engine_failure_is_fatal_and_names_the_asset() {
        let mut bundle = MemoryBundle::new().with_asset("broken.css", ".a{}");
        let before = bundle.clone();

        let err = purge_assets(&mut bundle, &Failing, &settings()).unwrap_err();

        assert!(err.to_string().contains("broken.css"));
        assert_eq!(bundle, before);
    }

    #[test]
    fn test_engine_options_from_map() {
        let map = json!({ "keyframes": true, "fontFace": "yes", "variables": true });
        let Value::Object(map) = map else {
            unreachable!()
        };

        let options = EngineOptions::from_map(map);

        assert!(options.keyframes);
        assert!(!options.font_face);
        assert_eq!(options.extra.get("variables"), Some(&Value::Bool(true)));
        assert!(!options.extra.contains_key("keyframes"));
    }
}
