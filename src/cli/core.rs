//! Shell state, dispatch, and the argument helpers shared by every command.

use std::io;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use tracing::warn;
use uuid::Uuid;

use crate::advisor::{ChatSession, UnconfiguredAdvisor};
use crate::config::{Config, ConfigManager};
use crate::core::services::{AchievementService, ServiceError, XpAward};
use crate::currency::{format_money, CurrencyService, OfflineRates};
use crate::domain::FinanceData;
use crate::errors::FinanceError;
use crate::storage::{check_integrity, JsonStorage, StorageBackend};

use super::commands;
use super::io as cli_io;
use super::registry::{CommandEntry, CommandRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) data: FinanceData,
    pub(crate) storage: JsonStorage,
    pub(crate) config_manager: ConfigManager,
    pub(crate) config: Config,
    pub(crate) currency: CurrencyService<OfflineRates>,
    pub(crate) advisor: ChatSession<UnconfiguredAdvisor>,
    pub(crate) theme: ColorfulTheme,
    pub(crate) last_command: Option<String>,
    pub(crate) running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let storage = JsonStorage::new_default()?;
        let config_manager = ConfigManager::new()?;
        Self::from_parts(mode, storage, config_manager)
    }

    /// Builds a shell over explicit storage and configuration locations.
    pub fn from_parts(
        mode: CliMode,
        mut storage: JsonStorage,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        for entry in commands::all_definitions() {
            registry.register(entry);
        }

        let config = config_manager.load()?;
        storage.set_retention(config.backup_retention);
        let data = storage.load_or_default();
        for message in check_integrity(&data).messages {
            warn!(%message, "data integrity");
            cli_io::print_warning(message);
        }

        Ok(Self {
            mode,
            registry,
            data,
            storage,
            currency: CurrencyService::offline(config.fx_cache_ttl_minutes),
            config_manager,
            config,
            advisor: ChatSession::new(UnconfiguredAdvisor),
            theme: ColorfulTheme::default(),
            last_command: None,
            running: true,
        })
    }

    pub fn data(&self) -> &FinanceData {
        &self.data
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn mode(&self) -> CliMode {
        self.mode
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub(crate) fn base_currency(&self) -> String {
        self.config.base_currency.clone()
    }

    pub(crate) fn money(&self, amount: f64) -> String {
        format_money(amount, &self.config.base_currency)
    }

    pub(crate) fn prompt(&self) -> String {
        format!("nexus [Lv {}]> ", self.data.level.level)
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_specs(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        self.registry
            .list()
            .into_iter()
            .map(|entry| (entry.name, entry.subcommands()))
            .collect()
    }

    /// Re-evaluates achievements and writes the document through the storage backend.
    pub(crate) fn persist(&mut self) -> CommandResult {
        let now = self.now();
        let unlocked = AchievementService::evaluate(&mut self.data, now);
        for title in unlocked {
            cli_io::print_success(format!("Achievement unlocked: {title}"));
        }
        self.storage.save(&self.data)?;
        Ok(())
    }

    pub(crate) fn persist_config(&mut self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        self.storage.set_retention(self.config.backup_retention);
        self.currency = CurrencyService::offline(self.config.fx_cache_ttl_minutes);
        Ok(())
    }

    pub(crate) fn report_award(&self, award: &XpAward) {
        cli_io::print_success(format!("+{} XP ({})", award.xp, award.source));
        if award.leveled_up {
            cli_io::print_success(format!("Level up! You reached level {}.", award.new_level));
        }
    }

    /// Confirmation prompt; script mode always proceeds.
    pub(crate) fn confirm(&self, prompt: &str, default: bool) -> Result<bool, CommandError> {
        match self.mode {
            CliMode::Script => Ok(true),
            CliMode::Interactive => cli_io::confirm_action(&self.theme, prompt, default),
        }
    }

    /// Returns the argument when given; otherwise asks for it interactively or fails with `usage`.
    pub(crate) fn require(
        &self,
        value: Option<&str>,
        label: &str,
        usage: &str,
    ) -> Result<String, CommandError> {
        if let Some(value) = value.map(str::trim).filter(|value| !value.is_empty()) {
            return Ok(value.to_string());
        }
        match self.mode {
            CliMode::Interactive => {
                let answer = cli_io::prompt_text(&self.theme, label, false)?;
                Ok(answer.trim().to_string())
            }
            CliMode::Script => Err(CommandError::InvalidArguments(format!(
                "missing {label}; usage: {usage}"
            ))),
        }
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match super::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                cli_io::print_warning(err);
                return Ok(LoopControl::Continue);
            }
        };
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        self.last_command = Some(line.trim().to_string());

        let control = self.dispatch(&raw.to_lowercase(), raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance);
        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Did you mean `{name}`?"));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    pub(crate) fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => Ok(()),
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
                Ok(())
            }
            other => {
                cli_io::print_error(other);
                Ok(())
            }
        }
    }
}

/// Positional arguments plus `--key value` / `--key=value` options.
#[derive(Debug, Default)]
pub(crate) struct Args<'a> {
    positional: Vec<&'a str>,
    options: Vec<(&'a str, &'a str)>,
}

impl<'a> Args<'a> {
    pub(crate) fn parse(args: &[&'a str]) -> Result<Self, CommandError> {
        let mut parsed = Args::default();
        let mut iter = args.iter().copied();
        while let Some(arg) = iter.next() {
            match arg.strip_prefix("--") {
                Some(option) if !option.is_empty() => {
                    if let Some((key, value)) = option.split_once('=') {
                        parsed.options.push((key, value));
                    } else {
                        let value = iter.next().ok_or_else(|| {
                            CommandError::InvalidArguments(format!("option `--{option}` needs a value"))
                        })?;
                        parsed.options.push((option, value));
                    }
                }
                _ => parsed.positional.push(arg),
            }
        }
        Ok(parsed)
    }

    pub(crate) fn get(&self, index: usize) -> Option<&'a str> {
        self.positional.get(index).copied()
    }

    /// Positional arguments from `index` on, joined with spaces.
    pub(crate) fn rest(&self, index: usize) -> Option<String> {
        let tail = self.positional.get(index..)?;
        if tail.is_empty() {
            None
        } else {
            Some(tail.join(" "))
        }
    }

    pub(crate) fn option(&self, key: &str) -> Option<&'a str> {
        self.options
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| *value)
    }
}

pub(crate) fn parse_amount(input: &str) -> Result<f64, CommandError> {
    let cleaned = input.trim().replace(',', "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CommandError::InvalidArguments(format!("invalid amount `{input}`")))
}

pub(crate) fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, CommandError> {
    match input.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today.pred_opt().unwrap_or(today)),
        "tomorrow" => Ok(today.succ_opt().unwrap_or(today)),
        _ => NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
            CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
        }),
    }
}

pub(crate) fn parse_optional_date(
    input: Option<&str>,
    today: NaiveDate,
) -> Result<NaiveDate, CommandError> {
    input.map_or(Ok(today), |value| parse_date(value, today))
}

pub(crate) fn parse_number<T: FromStr>(input: &str, label: &str) -> Result<T, CommandError> {
    input
        .trim()
        .parse::<T>()
        .map_err(|_| CommandError::InvalidArguments(format!("invalid {label} `{input}`")))
}

/// Parses one of the domain enums, whose `FromStr` errors are already readable.
pub(crate) fn parse_choice<T: FromStr<Err = String>>(input: &str) -> Result<T, CommandError> {
    input.parse::<T>().map_err(CommandError::InvalidArguments)
}

pub(crate) fn short_id(id: Uuid) -> String {
    let mut short = id.simple().to_string();
    short.truncate(8);
    short
}

/// Finds a record by case-insensitive name, or by a unique id prefix of at least four characters.
pub(crate) fn resolve_id<T>(
    items: &[T],
    key: &str,
    id_of: impl Fn(&T) -> Uuid,
    name_of: impl Fn(&T) -> &str,
    what: &str,
) -> Result<Uuid, CommandError> {
    let key = key.trim();
    if let Some(item) = items
        .iter()
        .find(|item| name_of(item).eq_ignore_ascii_case(key))
    {
        return Ok(id_of(item));
    }
    let prefix = key.to_ascii_lowercase().replace('-', "");
    if prefix.len() >= 4 {
        let matches: Vec<Uuid> = items
            .iter()
            .map(&id_of)
            .filter(|id| id.simple().to_string().starts_with(&prefix))
            .collect();
        match matches.as_slice() {
            [id] => return Ok(*id),
            [] => {}
            _ => {
                return Err(CommandError::InvalidArguments(format!(
                    "`{key}` matches several {what} records; use a longer id"
                )))
            }
        }
    }
    Err(CommandError::Message(format!("{what} `{key}` not found")))
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] FinanceError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<ServiceError> for CommandError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(err) => CommandError::Core(err),
            ServiceError::Invalid(message) => CommandError::InvalidArguments(message),
            not_found @ ServiceError::NotFound(_) => CommandError::Message(not_found.to_string()),
        }
    }
}

/// Failures that end the shell itself rather than a single command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] FinanceError),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

#[cfg(test)]
pub(crate) fn script_context(base: &std::path::Path) -> ShellContext {
    let storage = JsonStorage::new(Some(base.to_path_buf()), Some(3)).expect("storage");
    let config_manager = ConfigManager::with_base_dir(base.to_path_buf()).expect("config manager");
    ShellContext::from_parts(CliMode::Script, storage, config_manager).expect("shell context")
}

#[cfg(test)]
pub(crate) fn process_script(base: &std::path::Path, lines: &[&str]) -> ShellContext {
    let mut context = script_context(base);
    for line in lines {
        match context.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err).expect("report error"),
        }
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn args_split_options_from_positionals() {
        let raw = ["add", "50", "--date", "2024-01-02", "Lunch", "--notes=team"];
        let args = Args::parse(&raw).unwrap();
        assert_eq!(args.get(0), Some("add"));
        assert_eq!(args.rest(2).as_deref(), Some("Lunch"));
        assert_eq!(args.option("date"), Some("2024-01-02"));
        assert_eq!(args.option("NOTES"), Some("team"));
        assert!(args.rest(3).is_none());
    }

    #[test]
    fn dangling_option_is_rejected() {
        let err = Args::parse(&["add", "--date"]).unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn date_keywords_resolve_against_today() {
        let today = day(2024, 3, 1);
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(parse_date("yesterday", today).unwrap(), day(2024, 2, 29));
        assert_eq!(parse_date("2024-05-06", today).unwrap(), day(2024, 5, 6));
        assert!(parse_date("06/05/2024", today).is_err());
    }

    #[test]
    fn amounts_accept_grouping() {
        assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn resolve_by_name_or_prefix() {
        let ids = [Uuid::new_v4(), Uuid::new_v4()];
        let items = vec![(ids[0], "Alpha".to_string()), (ids[1], "Beta".to_string())];
        let by_name = resolve_id(&items, "beta", |i| i.0, |i| i.1.as_str(), "project").unwrap();
        assert_eq!(by_name, ids[1]);
        let prefix = short_id(ids[0]);
        let by_id = resolve_id(&items, &prefix, |i| i.0, |i| i.1.as_str(), "project").unwrap();
        assert_eq!(by_id, ids[0]);
        let missing = resolve_id(&items, "Gamma", |i| i.0, |i| i.1.as_str(), "project");
        assert!(matches!(missing, Err(CommandError::Message(_))));
    }

    #[test]
    fn script_mode_requires_arguments() {
        let temp = TempDir::new().unwrap();
        let context = script_context(temp.path());
        let err = context.require(None, "amount", "txn add").unwrap_err();
        assert!(err.to_string().contains("missing amount"));
        assert_eq!(context.require(Some(" 5 "), "amount", "").unwrap(), "5");
    }

    #[test]
    fn script_adds_and_persists_transaction() {
        let temp = TempDir::new().unwrap();
        process_script(
            temp.path(),
            &["txn add expense 42 Food \"Team lunch\" --date 2024-02-01", "exit"],
        );
        let reloaded = script_context(temp.path());
        assert_eq!(reloaded.data().transactions.len(), 1);
        assert_eq!(reloaded.data().transactions[0].description, "Team lunch");
    }

    #[test]
    fn persist_records_unlocked_achievements() {
        let temp = TempDir::new().unwrap();
        let mut context = script_context(temp.path());
        for i in 0..20 {
            context.data.transactions.push(crate::domain::Transaction::expense(
                format!("t{i}"),
                1.0,
                "Food",
                day(2024, 2, 1),
            ));
        }
        context.persist().unwrap();

        let reloaded = script_context(temp.path());
        let bookkeeper = reloaded
            .data()
            .achievements
            .iter()
            .find(|a| a.id == "transactions_20")
            .unwrap();
        assert!(bookkeeper.is_unlocked);
    }

    #[test]
    fn exit_stops_processing() {
        let temp = TempDir::new().unwrap();
        let context = process_script(temp.path(), &["exit", "txn add income 10 Salary Pay"]);
        assert!(!context.running);
        assert!(context.data().transactions.is_empty());
    }

    #[test]
    fn unknown_commands_do_not_fail() {
        let temp = TempDir::new().unwrap();
        let mut context = script_context(temp.path());
        let control = context.process_line("summry").unwrap();
        assert_eq!(control, LoopControl::Continue);
    }
}
