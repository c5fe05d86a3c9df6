use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Result, anyhow};

use crate::{
    config::Config,
    core::{
        collect::{ModuleRecord, scan_modules},
        engine::RuleEngine,
        extract::{Extractor, extractor_from_pattern},
        host::{BuildMode, ModuleGraph, OutputBundle},
        parsers::module::strip_query,
        purge::{AssetOutcome, EngineOptions, PurgeEngine, PurgeSettings, purge_assets},
        safelist::{Safelist, build_safelist},
        validate::{SelectorSet, validate_candidates},
    },
};

/// Module ids with these extensions are stylesheets and are never scanned.
const STYLESHEET_EXTENSIONS: &[&str] = &[
    "css", "scss", "sass", "less", "styl", "stylus", "pcss", "postcss", "sss",
];

/// Whether a module id names a stylesheet.
///
/// Query suffixes are ignored, except a `type=style` query that marks the
/// style block of a single-file component (`App.vue?vue&type=style&lang.css`).
pub fn is_stylesheet_id(id: &str) -> bool {
    let has_style_extension = Path::new(strip_query(id))
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| STYLESHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));

    has_style_extension
        || id
            .split_once('?')
            .is_some_and(|(_, query)| query.split('&').any(|param| param == "type=style"))
}

/// Output of Phase 1 and Phase 2.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Modules parsed and walked.
    pub scanned: usize,
    /// Tracked modules skipped (excluded from the build, or no final text).
    pub skipped: usize,
    /// Distinct candidate tokens before validation.
    pub candidates: usize,
    pub selectors: SelectorSet,
}

/// Everything one `generate_bundle` pass did.
#[derive(Debug)]
pub struct SweepReport {
    pub discovery: Discovery,
    pub safelist: Safelist,
    /// One entry per CSS asset, in bundle order.
    pub assets: Vec<AssetOutcome>,
}

impl SweepReport {
    pub fn changed_assets(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.assets.iter().filter(|a| a.is_changed())
    }

    pub fn rejected_count(&self) -> usize {
        self.assets.iter().map(|a| a.rejected().len()).sum()
    }
}

/// The selector discovery and purge pipeline, driven by host lifecycle hooks.
///
/// # Three-Phase Barrier
///
/// 1. **Phase 1: Scan** → candidate tokens from every tracked, included module
/// 2. **Phase 2: Validate** → `SelectorSet`, then the merged `Safelist`
/// 3. **Phase 3: Purge** → every CSS asset handed to the engine and replaced
///
/// Each phase finishes and hands over an owned collection before the next
/// one starts; nothing is streamed between phases.
///
/// # Lifecycle
///
/// - `config_resolved`: the host reports its root directory
/// - `track_module`: called for every loaded module
/// - `generate_bundle`: runs the three phases over the finished bundle
pub struct SweepPipeline {
    config: Config,
    root_dir: Option<PathBuf>,
    extractor: Arc<dyn Extractor>,
    engine: Option<Arc<dyn PurgeEngine>>,
    tracked: Vec<String>,
}

impl SweepPipeline {
    /// Build a pipeline from a validated config.
    pub fn new(config: Config) -> Result<Self> {
        let extractor: Arc<dyn Extractor> =
            extractor_from_pattern(config.extractor_pattern.as_deref())?.into();
        Ok(Self {
            config,
            root_dir: None,
            extractor,
            engine: None,
            tracked: Vec::new(),
        })
    }

    /// Replace the token extractor used for modules and content files.
    pub fn with_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the default `RuleEngine`.
    pub fn with_engine(mut self, engine: Arc<dyn PurgeEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Registration hook: the host's final root directory.
    pub fn config_resolved(&mut self, root: &Path) {
        self.root_dir = Some(root.to_path_buf());
    }

    /// Module-load hook. Returns whether the module will be scanned.
    pub fn track_module(&mut self, id: &str) -> bool {
        if is_stylesheet_id(id) {
            return false;
        }
        if !self.tracked.iter().any(|t| t == id) {
            self.tracked.push(id.to_string());
        }
        true
    }

    /// Track every module the graph knows about.
    pub fn track_all(&mut self, graph: &dyn ModuleGraph) {
        for id in graph.module_ids() {
            self.track_module(&id);
        }
    }

    pub fn tracked_modules(&self) -> &[String] {
        &self.tracked
    }

    /// Content globs: every HTML file under the root, then user globs.
    ///
    /// Relative user globs are resolved against the root.
    pub fn content_globs(&self) -> Result<Vec<String>> {
        let root = self.root()?;
        let mut globs = vec![root.join("**/*.html").to_string_lossy().to_string()];
        globs.extend(self.config.content.iter().map(|pattern| {
            if Path::new(pattern).is_absolute() {
                pattern.clone()
            } else {
                root.join(pattern).to_string_lossy().to_string()
            }
        }));
        Ok(globs)
    }

    fn root(&self) -> Result<&Path> {
        self.root_dir
            .as_deref()
            .ok_or_else(|| anyhow!("Root directory is unknown: config_resolved was never called"))
    }

    /// Phase 1 and Phase 2 over the tracked modules.
    pub fn discover(&self, graph: &dyn ModuleGraph) -> Result<Discovery> {
        let mut unknown = 0;
        let records: Vec<ModuleRecord> = self
            .tracked
            .iter()
            .filter_map(|id| {
                let record = graph.module_info(id);
                if record.is_none() {
                    unknown += 1;
                }
                record
            })
            .collect();

        // Phase 1: Scan
        let scan = scan_modules(&records, self.extractor.as_ref())?;

        // Phase 2: Validate
        let selectors = validate_candidates(&scan.tokens);

        Ok(Discovery {
            scanned: scan.scanned,
            skipped: scan.skipped + unknown,
            candidates: scan.tokens.len(),
            selectors,
        })
    }

    /// Bundle-generation hook. `None` outside production builds.
    pub fn generate_bundle(
        &self,
        graph: &dyn ModuleGraph,
        bundle: &mut dyn OutputBundle,
        mode: BuildMode,
    ) -> Result<Option<SweepReport>> {
        if mode == BuildMode::Serve {
            return Ok(None);
        }

        let discovery = self.discover(graph)?;
        let safelist = build_safelist(&self.config.safelist, &discovery.selectors)?;

        // Phase 3: Purge
        let settings = PurgeSettings {
            content: self.content_globs()?,
            safelist,
            options: EngineOptions::from_map(self.config.passthrough_engine_options()),
        };
        let engine: Arc<dyn PurgeEngine> = match &self.engine {
            Some(engine) => Arc::clone(engine),
            None => Arc::new(RuleEngine::new(Arc::clone(&self.extractor))),
        };
        let assets = purge_assets(bundle, engine.as_ref(), &settings)?;

        Ok(Some(SweepReport {
            discovery,
            safelist: settings.safelist,
            assets,
        }))
    }
}

impl std::fmt::Debug for SweepPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepPipeline")
            .field("root_dir", &self.root_dir)
            .field("tracked", &self.tracked.len())
            .finish_non_exhaustive()
    }
}
