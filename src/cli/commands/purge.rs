use anyhow::{Context, Result};

use super::super::args::PurgeCommand;
use super::helper::{open_workspace, scan_stats};
use super::{CommandResult, CommandSummary, PurgeSummary};
use crate::core::host::{BuildMode, FsBundle};

/// Purge the stylesheets under the output directory.
///
/// Without `--apply` the bundle is purged in memory only and the command
/// reports what would change.
pub fn purge(cmd: PurgeCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let workspace = open_workspace(&args.common)?;
    let mut bundle = FsBundle::open(&workspace.out_dir, args.apply)?;

    let report = workspace
        .pipeline
        .generate_bundle(&workspace.graph, &mut bundle, BuildMode::Build)?
        .context("Purge pipeline did not run")?;

    let summary = PurgeSummary {
        stats: scan_stats(&report.discovery),
        is_apply: args.apply,
        assets: report.assets,
    };
    let error_count = summary.changed().count();

    Ok(CommandResult {
        summary: CommandSummary::Purge(summary),
        error_count,
        exit_on_errors: !args.apply,
    })
}
