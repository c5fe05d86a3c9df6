//! Report formatting and printing utilities.
//!
//! Separate from core logic to allow csssweep to be used as a library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::commands::{
    CommandResult, CommandSummary, InitSummary, PurgeSummary, ScanStats, SelectorsSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::core::purge::AssetOutcome;

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(result, verbose, &mut io::stdout().lock());
}

/// Print a command result to a custom writer.
pub fn print_to<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    match &result.summary {
        CommandSummary::Purge(summary) => print_purge(summary, verbose, writer),
        CommandSummary::Selectors(summary) => print_selectors(summary, verbose, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

fn print_purge<W: Write>(summary: &PurgeSummary, verbose: bool, writer: &mut W) {
    if verbose {
        print_stats(&summary.stats, writer);
    }

    let changed: Vec<&AssetOutcome> = summary.changed().collect();
    if changed.is_empty() {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!(
                "Checked {} stylesheet(s) against {} selector(s) - nothing to purge",
                summary.assets.len(),
                summary.stats.selector_count
            )
            .green()
        );
        return;
    }

    let header = if summary.is_apply {
        "Purged".green().bold()
    } else {
        "Would purge".yellow().bold()
    };
    let _ = writeln!(
        writer,
        "{} {} stylesheet(s), {} selector(s) rejected:",
        header,
        changed.len(),
        summary.rejected_count()
    );

    let name_width = changed
        .iter()
        .map(|a| UnicodeWidthStr::width(a.file_name.as_str()))
        .max()
        .unwrap_or(0);

    for asset in &changed {
        let padding = name_width - UnicodeWidthStr::width(asset.file_name.as_str());
        let _ = writeln!(
            writer,
            "  {}{:padding$}  {} -> {}  ({} rejected)",
            asset.file_name,
            "",
            format_size(asset.original_size),
            format_size(asset.final_size()).green(),
            asset.rejected().len(),
            padding = padding
        );
        if verbose {
            for selector in asset.rejected() {
                let _ = writeln!(writer, "      {} {}", "-".red(), selector.dimmed());
            }
        }
    }

    if !summary.is_apply {
        let _ = writeln!(
            writer,
            "Run with {} to write the purged CSS.",
            "--apply".cyan()
        );
    }
}

fn print_stats<W: Write>(stats: &ScanStats, writer: &mut W) {
    let _ = writeln!(
        writer,
        "Scanned {} module(s) ({} skipped): {} candidate token(s), {} selector(s)",
        stats.modules_scanned, stats.modules_skipped, stats.candidate_count, stats.selector_count
    );
}

fn print_selectors<W: Write>(summary: &SelectorsSummary, verbose: bool, writer: &mut W) {
    for selector in &summary.selectors {
        let _ = writeln!(writer, "{}", selector);
    }

    // Summary goes to stderr so stdout stays one selector per line
    if verbose {
        print_stats(&summary.stats, &mut io::stderr().lock());
    }
    if summary.selectors.is_empty() {
        eprintln!(
            "{} No selectors discovered in {} module(s)",
            "warning:".bold().yellow(),
            summary.stats.modules_scanned
        );
    }
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    } else {
        let _ = writeln!(
            writer,
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} was not created", CONFIG_FILE_NAME).red()
        );
    }
}

/// `512 B`, `1.5 KiB`, `2.0 MiB`.
fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{} B", bytes)
    } else if value < KIB * KIB {
        format!("{:.1} KiB", value / KIB)
    } else {
        format!("{:.1} MiB", value / (KIB * KIB))
    }
}

// ============================================================
// Tests
// ============================================================
