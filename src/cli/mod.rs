pub mod commands;
mod core;
mod help;
pub mod io;
pub mod output;
mod registry;
mod shell;

pub use self::core::{CliError, CliMode, CommandError, CommandResult, ShellContext};
pub use registry::{CommandEntry, CommandRegistry};
pub use shell::{run_cli, SCRIPT_ENV};
