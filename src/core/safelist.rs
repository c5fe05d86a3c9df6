//! Safelist construction.
//!
//! The final safelist is always `baseline ++ user ++ discovered`. Baseline
//! entries can never be removed by configuration.

use std::fmt;

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::SafelistConfig;
use crate::core::validate::SelectorSet;

/// Baseline standard entries, in order.
///
/// - `*`, `html`, `body`: universal, root and document-body selectors
/// - `/aria-current/`: accessibility "current" state attributes
/// - `/svelte-/`: component-scoped class hashes
/// - bare pseudo-class (function) tokens, e.g. `:global(...)` left over by preprocessors
pub const BASELINE_STANDARD: &[&str] = &[
    "*",
    "html",
    "body",
    "/aria-current/",
    "/svelte-/",
    r"/^:[-\w]+(\(.*\))?$/",
];

pub const BASELINE_GREEDY: &[&str] = &["/svelte-/"];

/// A single safelist entry: either an exact selector or a regex.
#[derive(Debug, Clone)]
pub enum SafelistEntry {
    Exact(String),
    Pattern(Regex),
}

impl SafelistEntry {
    /// Parse a config string. `/source/` becomes a pattern, anything else is exact.
    pub fn parse(raw: &str) -> Result<Self> {
        if let Some(source) = pattern_source(raw) {
            let regex = Regex::new(source)
                .with_context(|| format!("Invalid safelist pattern: \"{}\"", raw))?;
            return Ok(Self::Pattern(regex));
        }
        Ok(Self::Exact(raw.to_string()))
    }

    pub fn matches(&self, selector: &str) -> bool {
        match self {
            Self::Exact(value) => value == selector,
            Self::Pattern(regex) => regex.is_match(selector),
        }
    }
}

impl PartialEq for SafelistEntry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact(a), Self::Exact(b)) => a == b,
            (Self::Pattern(a), Self::Pattern(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

impl fmt::Display for SafelistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => write!(f, "{}", value),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// `/source/` → `Some("source")`.
fn pattern_source(raw: &str) -> Option<&str> {
    raw.strip_prefix('/')
        .and_then(|rest| rest.strip_suffix('/'))
        .filter(|source| !source.is_empty())
}

pub fn parse_entries(raw: &[String]) -> Result<Vec<SafelistEntry>> {
    raw.iter().map(|r| SafelistEntry::parse(r)).collect()
}

fn parse_static(raw: &[&str]) -> Vec<SafelistEntry> {
    raw.iter()
        .filter_map(|r| SafelistEntry::parse(r).ok())
        .collect()
}

/// The merged safelist handed to the purge engine for every asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Safelist {
    /// Protects a selector it matches whole, or a single part of one.
    pub standard: Vec<SafelistEntry>,
    /// Protects any selector containing a matching part.
    pub greedy: Vec<SafelistEntry>,
    /// Like greedy, from the `deep` config list.
    pub deep: Vec<SafelistEntry>,
    /// Passed through from configuration untouched.
    pub keyframes: Vec<SafelistEntry>,
}

impl Safelist {
    /// Baseline entries only.
    pub fn baseline() -> Self {
        Self {
            standard: parse_static(BASELINE_STANDARD),
            greedy: parse_static(BASELINE_GREEDY),
            deep: Vec::new(),
            keyframes: Vec::new(),
        }
    }

    pub fn is_standard(&self, selector: &str) -> bool {
        self.standard.iter().any(|e| e.matches(selector))
    }

    pub fn is_greedy(&self, selector: &str) -> bool {
        self.greedy.iter().any(|e| e.matches(selector))
    }

    pub fn is_deep(&self, selector: &str) -> bool {
        self.deep.iter().any(|e| e.matches(selector))
    }

    pub fn is_keyframes(&self, name: &str) -> bool {
        self.keyframes.iter().any(|e| e.matches(name))
    }
}

/// Merge baseline, user configuration and discovered selectors.
pub fn build_safelist(user: &SafelistConfig, selectors: &SelectorSet) -> Result<Safelist> {
    let mut safelist = Safelist::baseline();

    safelist.standard.extend(parse_entries(&user.standard)?);
    safelist.standard.extend(
        selectors
            .iter()
            .map(|selector| SafelistEntry::Exact(selector.to_string())),
    );

    safelist.greedy.extend(parse_entries(&user.greedy)?);
    safelist.deep = parse_entries(&user.deep)?;
    safelist.keyframes = parse_entries(&user.keyframes)?;

    Ok(safelist)
}
