use crate::cli::exit_status::ExitStatus;
use crate::core::purge::AssetOutcome;

#[derive(Debug)]
pub enum CommandSummary {
    Purge(PurgeSummary),
    Selectors(SelectorsSummary),
    Init(InitSummary),
}

/// Module scan statistics shared by `purge` and `selectors`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub modules_scanned: usize,
    pub modules_skipped: usize,
    pub candidate_count: usize,
    pub selector_count: usize,
}

#[derive(Debug)]
pub struct PurgeSummary {
    pub stats: ScanStats,
    pub is_apply: bool,
    /// Every CSS asset in the output directory, purged or not.
    pub assets: Vec<AssetOutcome>,
}

impl PurgeSummary {
    pub fn changed(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.assets.iter().filter(|a| a.is_changed())
    }

    pub fn rejected_count(&self) -> usize {
        self.assets.iter().map(|a| a.rejected().len()).sum()
    }
}

#[derive(Debug)]
pub struct SelectorsSummary {
    pub stats: ScanStats,
    pub selectors: Vec<String>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
}

/// Result of running csssweep commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    /// Stylesheets with CSS left to purge.
    pub error_count: usize,
    /// If true, exit code 1 is returned when error_count > 0.
    /// Only dry runs set this; an applied purge has nothing left to report.
    pub exit_on_errors: bool,
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        if self.exit_on_errors && self.error_count > 0 {
            ExitStatus::Failure
        } else {
            ExitStatus::Success
        }
    }
}
