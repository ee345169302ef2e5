use std::{
    borrow::Cow,
    fmt,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::{ValidationContext, ValidationResult, Validator},
    Context as ReadlineContext, Editor, Helper,
};
use shell_words::split;

use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::io as cli_io;
use crate::utils::build_info;

pub const SCRIPT_ENV: &str = "NEXUS_FINANCE_CLI_SCRIPT";

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;

    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_specs())));

    cli_io::print_info(format!(
        "NexusFinance {} - type `help` for commands.",
        build_info::current().short()
    ));

    while context.running {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                match context.process_line(trimmed) {
                    Ok(LoopControl::Continue) => {}
                    Ok(LoopControl::Exit) => break,
                    Err(err) => context.report_error(err)?,
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                cli_io::print_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !context.running {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match context.process_line(trimmed) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

/// Completes command names in the first position and subcommands in the second.
struct CommandHelper {
    commands: Vec<(String, Vec<String>)>,
}

impl CommandHelper {
    fn new(specs: Vec<(&'static str, Vec<&'static str>)>) -> Self {
        let mut commands: Vec<(String, Vec<String>)> = specs
            .into_iter()
            .map(|(name, subs)| {
                (
                    name.to_ascii_lowercase(),
                    subs.into_iter().map(str::to_string).collect(),
                )
            })
            .collect();
        commands.sort_by(|a, b| a.0.cmp(&b.0));
        commands.dedup_by(|a, b| a.0 == b.0);
        Self { commands }
    }

    fn candidates(&self, words: &[&str], needle: &str) -> Vec<String> {
        let needle = needle.to_ascii_lowercase();
        match words {
            [] => self
                .commands
                .iter()
                .map(|(name, _)| name)
                .filter(|name| name.starts_with(&needle))
                .cloned()
                .collect(),
            [command] => self
                .commands
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(command))
                .map(|(_, subs)| {
                    subs.iter()
                        .filter(|sub| sub.starts_with(&needle))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let words: Vec<&str> = prefix[..start].split_whitespace().collect();
        let pairs = self
            .candidates(&words, &prefix[start..])
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }
}

impl Validator for CommandHelper {
    fn validate(&self, _ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        Ok(ValidationResult::Valid(None))
    }
}

pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, ParseError> {
    split(input).map_err(|err| ParseError {
        message: err.to_string(),
    })
}

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse line: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helper() -> CommandHelper {
        CommandHelper::new(vec![
            ("txn", vec!["add", "list", "remove"]),
            ("team", vec!["add", "payroll"]),
            ("help", vec![]),
        ])
    }

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line("txn add expense 12 Food \"Team lunch\"").unwrap();
        assert_eq!(tokens, vec!["txn", "add", "expense", "12", "Food", "Team lunch"]);
        assert!(parse_command_line("txn add \"open").is_err());
    }

    #[test]
    fn completes_commands_then_subcommands() {
        let helper = helper();
        assert_eq!(helper.candidates(&[], "t"), vec!["team", "txn"]);
        assert_eq!(helper.candidates(&["txn"], "r"), vec!["remove"]);
        assert_eq!(helper.candidates(&["TEAM"], ""), vec!["add", "payroll"]);
        assert!(helper.candidates(&["txn", "add"], "").is_empty());
    }
}
