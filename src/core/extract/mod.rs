//! Token extraction: turns arbitrary source text into candidate selector tokens.
//!
//! Extractors know nothing about CSS. They over-generate on purpose and leave
//! filtering to `core::validate`.

use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Matches runs of characters that can make up a class name or element name.
static DEFAULT_TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+").unwrap());

/// Turns source text into candidate selector tokens.
///
/// Implementations must be pure: the same text always yields the same tokens.
pub trait Extractor: Send + Sync {
    fn extract(&self, text: &str) -> Vec<String>;
}

impl<F> Extractor for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn extract(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Splits text into maximal `[A-Za-z0-9_-]+` runs.
///
/// ```
/// use csssweep::core::extract::{DefaultExtractor, Extractor};
///
/// let tokens = DefaultExtractor.extract(r#"class="btn btn-primary""#);
/// assert_eq!(tokens, vec!["class", "btn", "btn-primary"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl Extractor for DefaultExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        DEFAULT_TOKEN_REGEX
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Extractor driven by a user-supplied regex; every match is one token.
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    regex: Regex,
}

impl PatternExtractor {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("Invalid extractor pattern: \"{}\"", pattern))?;
        Ok(Self { regex })
    }
}

impl Extractor for PatternExtractor {
    fn extract(&self, text: &str) -> Vec<String> {
        self.regex
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .filter(|token| !token.is_empty())
            .collect()
    }
}

/// Build the extractor for an optional `extractorPattern` config value.
pub fn extractor_from_pattern(pattern: Option<&str>) -> Result<Box<dyn Extractor>> {
    match pattern {
        Some(p) => Ok(Box::new(PatternExtractor::new(p)?)),
        None => Ok(Box::new(DefaultExtractor)),
    }
}
