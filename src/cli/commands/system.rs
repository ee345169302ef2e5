use std::io::{stdout, Write};

use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};

use crate::cli::core::{CliMode, CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::domain::CURRENT_SCHEMA_VERSION;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandEntry::new("version", "Show build metadata", "version", cmd_version),
        CommandEntry::new("clear", "Clear the terminal", "clear", cmd_clear),
        CommandEntry::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(name) => match context.command(&name.to_lowercase()) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(name),
        },
        None => help::print_overview(&context.registry),
    }
    Ok(())
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output_section(format!("NexusFinance {}", meta.version));
    io::print_info(format!("  Data schema : v{CURRENT_SCHEMA_VERSION}"));
    io::print_info(format!("  Build hash  : {} ({})", meta.git_hash, meta.git_status));
    io::print_info(format!("  Built at    : {}", meta.timestamp));
    io::print_info(format!("  Target      : {}", meta.target));
    io::print_info(format!("  Profile     : {}", meta.profile));
    io::print_info(format!("  Rustc       : {}", meta.rustc));
    io::print_info(format!(
        "  Data file   : {}",
        context.storage.data_path().display()
    ));
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    if context.mode() == CliMode::Script {
        return Ok(());
    }
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    out.flush()?;
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
