//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `purge`: Remove unused CSS rules from the build output (dry-run by default)
//! - `selectors`: Print the selectors discovered in the source modules
//! - `init`: Initialize csssweep configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Purge(cmd)) => cmd.args.common.verbose,
            Some(Command::Selectors(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root directory (default: current directory)
    #[arg(long, env = "CSSSWEEP_ROOT")]
    pub root: Option<PathBuf>,

    /// Build output directory, relative to the root (overrides config file)
    #[arg(long)]
    pub out_dir: Option<String>,

    /// Extra content glob to search for used selectors (repeatable)
    #[arg(long)]
    pub content: Vec<String>,

    /// Extra standard safelist entry, `/regex/` allowed (repeatable)
    #[arg(long)]
    pub safelist: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser)]
pub struct PurgeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Actually rewrite stylesheets (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct PurgeCommand {
    #[command(flatten)]
    pub args: PurgeArgs,
}

#[derive(Debug, Parser)]
pub struct SelectorsArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct SelectorsCommand {
    #[command(flatten)]
    pub args: SelectorsArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Remove CSS rules whose selectors are never used by the built app
    Purge(PurgeCommand),
    /// Print every selector discovered in the source modules, one per line
    Selectors(SelectorsCommand),
    /// Initialize a new .csssweeprc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_purge_flags() {
        let args = Arguments::try_parse_from([
            "csssweep",
            "purge",
            "--apply",
            "--out-dir",
            "build",
            "--content",
            "a/**/*.hbs",
            "--content",
            "b/**/*.php",
            "--safelist",
            "/^toast-/",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose());
        let Some(Command::Purge(cmd)) = args.command else {
            panic!("expected purge");
        };
        assert!(cmd.args.apply);
        assert_eq!(cmd.args.common.out_dir.as_deref(), Some("build"));
        assert_eq!(cmd.args.common.content, vec!["a/**/*.hbs", "b/**/*.php"]);
        assert_eq!(cmd.args.common.safelist, vec!["/^toast-/"]);
    }

    #[test]
    fn test_purge_is_dry_run_by_default() {
        let args = Arguments::try_parse_from(["csssweep", "purge"]).unwrap();
        let Some(Command::Purge(cmd)) = args.command else {
            panic!("expected purge");
        };
        assert!(!cmd.args.apply);
        assert!(!cmd.args.common.verbose);
    }

    #[test]
    fn test_init_takes_no_flags() {
        assert!(Arguments::try_parse_from(["csssweep", "init", "--apply"]).is_err());
        let args = Arguments::try_parse_from(["csssweep", "init"]).unwrap();
        assert!(matches!(args.command, Some(Command::Init)));
    }
}
