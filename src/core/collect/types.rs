use std::collections::BTreeSet;

/// Unvalidated tokens harvested from module text, deduplicated and ordered.
pub type CandidateTokens = BTreeSet<String>;

/// A source module tracked during the build.
///
/// Registered at load time, read once during bundle generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Module id as reported by the host (usually an absolute path).
    pub id: String,
    /// False when the module was dropped from the final build (e.g. tree-shaken).
    pub included: bool,
    /// Final transformed text, or `None` when the host has none to offer.
    pub code: Option<String>,
}

impl ModuleRecord {
    pub fn new(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            included: true,
            code: Some(code.into()),
        }
    }

    /// A module the host reports as excluded from the final build.
    pub fn excluded(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            included: false,
            ..Self::new(id, code)
        }
    }

    /// Whether the scanner should read this module at all.
    pub fn is_scannable(&self) -> bool {
        self.included && self.code.is_some()
    }
}

/// Output of Phase 1: every candidate token reachable from included modules.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub tokens: CandidateTokens,
    /// Number of modules parsed and walked.
    pub scanned: usize,
    /// Number of modules skipped (not included, or no final text).
    pub skipped: usize,
}
