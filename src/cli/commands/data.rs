use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::DataService;
use crate::storage::json_backend::BACKUP_PREFIXES;
use crate::storage::{check_integrity, StorageBackend};
use crate::utils::backups::backup_timestamp;

const USAGE: &str = "data <backup|backups|restore|reset|check> ...\n  \
    data backup [note]\n  \
    data backups\n  \
    data restore <name|number>\n  \
    data reset\n  \
    data check";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "data",
        "Back up, restore, verify or reset the data file",
        USAGE,
        cmd_data,
    )]
}

fn cmd_data(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    };
    match sub.to_ascii_lowercase().as_str() {
        "backup" => backup(context, rest),
        "backups" => list(context),
        "restore" => restore(context, rest),
        "reset" => reset(context),
        "check" => check(context),
        other => Err(unknown_subcommand("data", other, USAGE)),
    }
}

fn backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let name = context.storage.backup(&context.data, note.as_deref())?;
    io::print_success(format!("Backup `{name}` created."));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let names = context.storage.list_backups()?;
    output_section("Data backups");
    print_backups(&names, &BACKUP_PREFIXES);
    Ok(())
}

fn restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = context.require(args.first().copied(), "backup name or number", USAGE)?;
    let names = context.storage.list_backups()?;
    let name = backup_reference(&names, &reference)?;
    if !context.confirm(&format!("Replace current data with `{name}`?"), false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    context.data = context.storage.restore(&name)?;
    io::print_success(format!("Data restored from `{name}`."));
    Ok(())
}

fn reset(context: &mut ShellContext) -> CommandResult {
    if !context.confirm("Delete all records? Categories are kept.", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let name = context.storage.backup(&context.data, Some("before reset"))?;
    DataService::clear_all(&mut context.data);
    context.persist()?;
    io::print_success(format!("All data cleared. Previous state saved as `{name}`."));
    Ok(())
}

fn check(context: &mut ShellContext) -> CommandResult {
    let warnings = check_integrity(&context.data);
    if warnings.is_empty() {
        io::print_success("No integrity problems found.");
        return Ok(());
    }
    for message in &warnings.messages {
        io::print_warning(message);
    }
    Ok(())
}

/// Numbered listing, newest first; the numbers are accepted by `restore`.
pub(crate) fn print_backups(names: &[String], prefixes: &[&str]) {
    if names.is_empty() {
        io::print_info("No backups yet.");
        return;
    }
    let rows: Vec<Vec<String>> = names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            vec![
                (index + 1).to_string(),
                name.clone(),
                backup_timestamp(prefixes, name)
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    table(&["#", "Name", "Created (UTC)"], &rows);
}

/// Accepts an exact backup name or its 1-based position in the newest-first listing.
pub(crate) fn backup_reference(names: &[String], reference: &str) -> Result<String, CommandError> {
    let reference = reference.trim();
    if let Some(name) = names.iter().find(|name| name.as_str() == reference) {
        return Ok(name.clone());
    }
    if let Ok(position) = reference.parse::<usize>() {
        if let Some(name) = position.checked_sub(1).and_then(|index| names.get(index)) {
            return Ok(name.clone());
        }
    }
    Err(CommandError::Message(format!("backup `{reference}` not found")))
}
