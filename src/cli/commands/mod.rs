pub mod account;
pub mod advisor;
pub mod analytics;
pub mod budget;
pub mod category;
pub mod config;
pub mod daily;
pub mod data;
pub mod export;
pub mod fx;
pub mod investment;
pub mod liquidity;
pub mod progress;
pub mod project;
pub mod recurring;
pub mod summary;
pub mod system;
pub mod team;
pub mod transaction;

use crate::cli::core::CommandError;
use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(summary::definitions());
    commands.extend(transaction::definitions());
    commands.extend(account::definitions());
    commands.extend(category::definitions());
    commands.extend(investment::definitions());
    commands.extend(project::definitions());
    commands.extend(liquidity::definitions());
    commands.extend(team::definitions());
    commands.extend(daily::definitions());
    commands.extend(progress::definitions());
    commands.extend(budget::definitions());
    commands.extend(recurring::definitions());
    commands.extend(fx::definitions());
    commands.extend(analytics::definitions());
    commands.extend(export::definitions());
    commands.extend(advisor::definitions());
    commands.extend(data::definitions());
    commands.extend(config::definitions());
    commands
}

pub(crate) fn unknown_subcommand(command: &str, sub: &str, usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!(
        "unknown {command} subcommand `{sub}`; usage: {usage}"
    ))
}
