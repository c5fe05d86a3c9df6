use anyhow::Result;

use super::super::args::SelectorsCommand;
use super::helper::{open_workspace, scan_stats};
use super::{CommandResult, CommandSummary, SelectorsSummary};

/// Run discovery only: scan and validate, touch no output.
pub fn selectors(cmd: SelectorsCommand) -> Result<CommandResult> {
    let workspace = open_workspace(&cmd.args.common)?;
    let discovery = workspace.pipeline.discover(&workspace.graph)?;

    Ok(CommandResult {
        summary: CommandSummary::Selectors(SelectorsSummary {
            stats: scan_stats(&discovery),
            selectors: discovery.selectors.iter().map(String::from).collect(),
        }),
        error_count: 0,
        exit_on_errors: false,
    })
}
