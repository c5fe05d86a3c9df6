use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{extract::PatternExtractor, safelist::parse_entries};

pub const CONFIG_FILE_NAME: &str = ".csssweeprc.json";

/// Engine option keys that are always computed or forced internally.
pub const RESERVED_ENGINE_OPTIONS: &[&str] = &["css", "rejected", "rejectedCss"];

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directories (or globs) holding the source modules to scan.
    #[serde(default = "default_includes")]
    pub includes: Vec<String>,
    /// Modules matching these stay tracked but count as excluded from the build.
    #[serde(default)]
    pub ignores: Vec<String>,
    /// Build output directory holding the emitted assets.
    #[serde(default = "default_out_dir")]
    pub out_dir: String,
    /// Extra content globs, on top of every HTML file under the root.
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub safelist: SafelistConfig,
    /// Regex replacing the default token extractor; every match is a token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor_pattern: Option<String>,
    /// Any other key is handed to the purge engine verbatim.
    #[serde(flatten)]
    pub engine_options: Map<String, Value>,
}

/// User safelist additions. Strings wrapped in slashes (`/^btn-/`) are regexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafelistConfig {
    #[serde(default)]
    pub standard: Vec<String>,
    #[serde(default)]
    pub greedy: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deep: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<String>,
}

fn default_includes() -> Vec<String> {
    ["src"].map(String::from).to_vec()
}

fn default_out_dir() -> String {
    "dist".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            includes: default_includes(),
            ignores: Vec::new(),
            out_dir: default_out_dir(),
            content: Vec::new(),
            safelist: SafelistConfig::default(),
            extractor_pattern: None,
            engine_options: Map::new(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error for invalid glob patterns, safelist regexes or
    /// extractor pattern.
    pub fn validate(&self) -> Result<()> {
        check_globs("ignores", self.ignores.iter())?;
        // Includes without wildcards are literal directory paths
        check_globs(
            "includes",
            self.includes
                .iter()
                .filter(|p| p.contains('*') || p.contains('?')),
        )?;
        check_globs("content", self.content.iter())?;

        let safelist = &self.safelist;
        for (field, entries) in [
            ("standard", &safelist.standard),
            ("greedy", &safelist.greedy),
            ("deep", &safelist.deep),
            ("keyframes", &safelist.keyframes),
        ] {
            parse_entries(entries).with_context(|| format!("Invalid 'safelist.{}'", field))?;
        }

        if let Some(pattern) = &self.extractor_pattern {
            PatternExtractor::new(pattern)?;
        }

        Ok(())
    }

    /// Engine options with the reserved keys removed.
    pub fn passthrough_engine_options(&self) -> Map<String, Value> {
        self.engine_options
            .iter()
            .filter(|(key, _)| !RESERVED_ENGINE_OPTIONS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

fn check_globs<'a>(field: &str, patterns: impl Iterator<Item = &'a String>) -> Result<()> {
    for pattern in patterns {
        Pattern::new(pattern)
            .with_context(|| format!("Invalid glob pattern in '{}': \"{}\"", field, pattern))?;
    }
    Ok(())
}

/// Pretty-printed default config, as written by `csssweep init`.
pub fn default_config_json() -> Result<String> {
    serde_json::to_string_pretty(&Config::default()).context("Failed to generate default config.")
}

/// Search `start_dir` and its ancestors for the config file.
///
/// The search stops at the first directory containing `.git`, so a config
/// outside the repository is never picked up.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    for dir in start_dir.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    None
}

pub struct ConfigLoadResult {
    pub config: Config,
    /// False when no config file was found and defaults are in use.
    pub from_file: bool,
}

/// Load and validate the nearest config file, falling back to defaults.
pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    let Some(path) = find_config_file(start_dir) else {
        return Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        });
    };

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    config.validate()?;

    Ok(ConfigLoadResult {
        config,
        from_file: true,
    })
}
