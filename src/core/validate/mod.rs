//! Phase 2: Validation - filter candidate tokens down to usable selectors.
//!
//! A token is admitted only when it parses as a CSS selector list *and*
//! compiles as a regex, since discovered selectors end up in the safelist
//! next to pattern entries. Everything else is dropped without a trace.

pub mod grammar;

use std::collections::BTreeSet;

use regex::Regex;

pub use grammar::{SelectorError, parse_selector_list};

/// Validated selectors discovered in source modules.
///
/// Iteration order is lexicographic so builds are reproducible. The set only
/// grows: there is deliberately no removal API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorSet {
    selectors: BTreeSet<String>,
}

impl SelectorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a token if it passes both gates. Returns whether it was admitted.
    pub fn admit(&mut self, token: &str) -> bool {
        if !is_admissible(token) {
            return false;
        }
        self.selectors.insert(token.to_string());
        true
    }

    pub fn contains(&self, selector: &str) -> bool {
        self.selectors.contains(selector)
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selectors.iter().map(String::as_str)
    }
}

pub fn is_valid_selector(token: &str) -> bool {
    parse_selector_list(token).is_ok()
}

pub fn is_valid_pattern(token: &str) -> bool {
    Regex::new(token).is_ok()
}

pub fn is_admissible(token: &str) -> bool {
    is_valid_selector(token) && is_valid_pattern(token)
}

/// Build the selector set from Phase 1 output.
pub fn validate_candidates<I, S>(tokens: I) -> SelectorSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = SelectorSet::new();
    for token in tokens {
        set.admit(token.as_ref());
    }
    set
}
