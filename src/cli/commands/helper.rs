use std::{env, fs, path::PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::args::CommonArgs;
use super::ScanStats;
use crate::{
    config::{CONFIG_FILE_NAME, Config, ConfigLoadResult, load_config},
    core::{
        context::{Discovery, SweepPipeline},
        host::{FsModuleGraph, fs::report_skipped},
    },
};

/// A project opened from the command line: config, source modules and a
/// pipeline that has already tracked them.
pub struct Workspace {
    pub root: PathBuf,
    pub out_dir: PathBuf,
    pub graph: FsModuleGraph,
    pub pipeline: SweepPipeline,
}

/// Load config (CLI args > config file > defaults) and scan source modules.
pub fn open_workspace(common: &CommonArgs) -> Result<Workspace> {
    let root = match &common.root {
        Some(root) => root.clone(),
        None => env::current_dir().context("Cannot read the current directory")?,
    };
    let root = fs::canonicalize(&root)
        .with_context(|| format!("Root directory '{}' does not exist.", root.display()))?;

    let ConfigLoadResult { mut config, from_file } = load_config(&root)?;
    if common.verbose && !from_file {
        eprintln!(
            "{} No {} found, using defaults",
            "note:".bold().cyan(),
            CONFIG_FILE_NAME
        );
    }
    apply_overrides(&mut config, common);
    config.validate()?;

    let out_dir = root.join(&config.out_dir);
    let graph = FsModuleGraph::scan(
        &root,
        &config.includes,
        &config.ignores,
        std::slice::from_ref(&out_dir),
        common.verbose,
    );
    report_skipped(&graph, common.verbose);

    let mut pipeline = SweepPipeline::new(config)?;
    pipeline.config_resolved(&root);
    pipeline.track_all(&graph);

    Ok(Workspace {
        root,
        out_dir,
        graph,
        pipeline,
    })
}

fn apply_overrides(config: &mut Config, common: &CommonArgs) {
    if let Some(out_dir) = &common.out_dir {
        config.out_dir = out_dir.clone();
    }
    config.content.extend(common.content.iter().cloned());
    config
        .safelist
        .standard
        .extend(common.safelist.iter().cloned());
}

pub fn scan_stats(discovery: &Discovery) -> ScanStats {
    ScanStats {
        modules_scanned: discovery.scanned,
        modules_skipped: discovery.skipped,
        candidate_count: discovery.candidates,
        selector_count: discovery.selectors.len(),
    }
}
