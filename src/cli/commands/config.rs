use crate::cli::commands::data::{backup_reference, print_backups};
use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::config::Config;

const USAGE: &str = "config <show|set|backup|backups|restore> ...\n  \
    config set <key> <value>\n  \
    config backup [note]\n  \
    config restore <name|number>";

const BACKUP_PREFIX: &str = "config";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and manage preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return show(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "show" => show(context),
        "set" => set(context, rest),
        "backup" => backup(context, rest),
        "backups" => {
            output_section("Configuration backups");
            print_backups(&context.config_manager.list_backups()?, &[BACKUP_PREFIX]);
            Ok(())
        }
        "restore" => restore(context, rest),
        other => Err(unknown_subcommand("config", other, USAGE)),
    }
}

fn show(context: &mut ShellContext) -> CommandResult {
    output_section("Configuration");
    let rows: Vec<Vec<String>> = context
        .config
        .entries()
        .into_iter()
        .map(|(key, value)| vec![key.to_string(), value])
        .collect();
    table(&["Key", "Value"], &rows);
    io::print_info(format!(
        "Stored at {}",
        context.config_manager.path().display()
    ));
    Ok(())
}

fn set(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "setting", USAGE)?;
    let value = context.require(
        args.get(1..).map(|words| words.join(" ")).as_deref(),
        "value",
        USAGE,
    )?;
    let key = key.to_ascii_lowercase();
    if !Config::KEYS.contains(&key.as_str()) {
        io::print_hint(format!("Known settings: {}", Config::KEYS.join(", ")));
    }
    context.config.set(&key, &value)?;
    context.persist_config()?;
    io::print_success(format!("`{key}` updated."));
    Ok(())
}

fn backup(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let note = (!args.is_empty()).then(|| args.join(" "));
    let name = context
        .config_manager
        .backup(&context.config, note.as_deref())?;
    io::print_success(format!("Configuration backup `{name}` created."));
    Ok(())
}

fn restore(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = context.require(args.first().copied(), "backup name or number", USAGE)?;
    let names = context.config_manager.list_backups()?;
    let name = backup_reference(&names, &reference)?;
    context.config = context.config_manager.restore(&name)?;
    context.persist_config()?;
    io::print_success(format!("Configuration restored from `{name}`."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use crate::config::ConfigManager;
    use tempfile::TempDir;

    #[test]
    fn set_validates_and_persists() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "config set base_currency usd",
                "config set base_currency XYZ",
                "config set backup_retention 2",
            ],
        );
        assert_eq!(context.config().base_currency, "USD");
        let stored = ConfigManager::with_base_dir(temp.path().to_path_buf())
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(stored.base_currency, "USD");
        assert_eq!(stored.backup_retention, 2);
    }

    #[test]
    fn restore_returns_to_backed_up_values() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "config backup original",
                "config set locale fr-FR",
                "config restore 1",
            ],
        );
        assert_eq!(context.config().locale, "en-US");
    }
}
