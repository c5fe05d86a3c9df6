use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, init::init, purge::purge, selectors::selectors},
};

/// Dispatch to the command handler.
///
/// # Returns
/// - `Ok(CommandResult)` with the command summary and exit behavior
/// - `Err` if the command fails (config error, missing output, parse error)
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Purge(cmd)) => purge(cmd),
        Some(Command::Selectors(cmd)) => selectors(cmd),
        Some(Command::Init) => init(),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
