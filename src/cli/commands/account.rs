use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{
    parse_amount, parse_choice, resolve_id, short_id, Args, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::AccountService;
use crate::domain::{Account, AccountKind};

const USAGE: &str = "account <add|list|edit|remove> ...\n  \
    account add <name> <checking|savings|cash> <balance> [--institution I]\n  \
    account edit <account> [--name N] [--kind K] [--balance B] [--institution I]\n  \
    account remove <account>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "account",
        "Manage bank, savings and cash accounts",
        USAGE,
        cmd_account,
    )]
}

fn cmd_account(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context),
        "edit" => edit(context, rest),
        "remove" | "rm" => remove(context, rest),
        other => Err(unknown_subcommand("account", other, USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let name = context.require(args.get(0), "account name", USAGE)?;
    let kind: AccountKind = parse_choice(&context.require(args.get(1), "account kind", USAGE)?)?;
    let balance = parse_amount(&context.require(args.get(2), "opening balance", USAGE)?)?;
    let mut account = Account::new(name, kind, balance);
    if let Some(institution) = args.option("institution") {
        account = account.with_institution(institution);
    }
    let label = account.name.clone();
    AccountService::add(&mut context.data, account)?;
    context.persist()?;
    io::print_success(format!("Account `{label}` added."));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    output_section("Accounts");
    if context.data.accounts.is_empty() {
        io::print_info("No accounts yet. Use `account add`.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = context
        .data
        .accounts
        .iter()
        .map(|account| {
            vec![
                short_id(account.id),
                account.name.clone(),
                account.kind.to_string(),
                account.institution.clone(),
                context.money(account.balance),
            ]
        })
        .collect();
    table(&["Id", "Name", "Kind", "Institution", "Balance"], &rows);
    io::print_info(format!("Total: {}", context.money(context.data.total_balance())));
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let key = context.require(args.get(0), "account", USAGE)?;
    let id = resolve_id(
        &context.data.accounts,
        &key,
        |account| account.id,
        |account| account.name.as_str(),
        "account",
    )?;
    let Some(mut changes) = context.data.accounts.iter().find(|a| a.id == id).cloned() else {
        return Ok(());
    };
    if let Some(name) = args.option("name") {
        changes.name = name.to_string();
    }
    if let Some(kind) = args.option("kind") {
        changes.kind = parse_choice(kind)?;
    }
    if let Some(balance) = args.option("balance") {
        changes.balance = parse_amount(balance)?;
    }
    if let Some(institution) = args.option("institution") {
        changes.institution = institution.to_string();
    }
    AccountService::edit(&mut context.data, id, changes)?;
    context.persist()?;
    io::print_success("Account updated.");
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "account", USAGE)?;
    let id = resolve_id(
        &context.data.accounts,
        &key,
        |account| account.id,
        |account| account.name.as_str(),
        "account",
    )?;
    if !context.confirm("Remove this account?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = AccountService::remove(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("Account `{}` removed.", removed.name));
    Ok(())
}
