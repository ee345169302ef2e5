use uuid::Uuid;

use crate::cli::commands::{transaction, unknown_subcommand};
use crate::cli::core::{
    parse_amount, parse_choice, parse_date, parse_number, parse_optional_date, resolve_id,
    short_id, Args, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::RecurringService;
use crate::currency::format_money;
use crate::domain::{RecurrenceKind, RecurringTransaction, Transaction, TransactionKind};

const USAGE: &str = "recurring <add|list|apply|pause|resume|remove> ...\n  \
    recurring add <income|expense> <amount> <category> <daily|weekly|monthly|yearly> <description> [--start D] [--end D] [--day N] [--currency C]\n  \
    recurring apply\n  \
    recurring pause <series>\n  \
    recurring resume <series>\n  \
    recurring remove <series>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "recurring",
        "Scheduled income and expenses booked when due",
        USAGE,
        cmd_recurring,
    )]
}

fn cmd_recurring(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context),
        "apply" => apply(context),
        "pause" => set_active(context, rest, false),
        "resume" => set_active(context, rest, true),
        "remove" | "rm" => remove(context, rest),
        other => Err(unknown_subcommand("recurring", other, USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let today = context.today();
    let kind: TransactionKind =
        parse_choice(&context.require(args.get(0), "type (income/expense)", USAGE)?)?;
    let amount = parse_amount(&context.require(args.get(1), "amount", USAGE)?)?;
    let category = context.require(args.get(2), "category", USAGE)?;
    let recurrence: RecurrenceKind =
        parse_choice(&context.require(args.get(3), "recurrence", USAGE)?)?;
    let description = context.require(args.rest(4).as_deref(), "description", USAGE)?;
    let start = parse_optional_date(args.option("start"), today)?;

    let category = context
        .data
        .category(&category)
        .map(|known| known.name.clone())
        .unwrap_or(category);
    let mut series =
        RecurringTransaction::new(description, amount, kind, category, recurrence, start);
    series.end_date = args
        .option("end")
        .map(|value| parse_date(value, today))
        .transpose()?;
    series.day_of_month = args
        .option("day")
        .map(|value| parse_number::<u32>(value, "day of month"))
        .transpose()?;
    series.currency = args
        .option("currency")
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| context.base_currency());

    let next = series.next_due(today);
    RecurringService::add(&mut context.data, series)?;
    context.persist()?;
    match next {
        Some(date) => io::print_success(format!("Recurring {recurrence} series added; next on {date}.")),
        None => io::print_success(format!("Recurring {recurrence} series added.")),
    }
    io::print_hint("Run `recurring apply` to book occurrences that are already due.");
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    let today = context.today();
    output_section("Recurring");
    if context.data.recurring.is_empty() {
        io::print_info("No recurring transactions. Use `recurring add`.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = context
        .data
        .recurring
        .iter()
        .map(|series| {
            vec![
                short_id(series.id),
                series.description.clone(),
                series.kind.to_string(),
                format_money(series.amount, &series.currency),
                series.category.clone(),
                series.recurrence.to_string(),
                series
                    .next_due(today)
                    .map(|date| date.to_string())
                    .unwrap_or_else(|| "-".into()),
                if series.is_active { "Active" } else { "Paused" }.to_string(),
            ]
        })
        .collect();
    table(
        &["Id", "Description", "Type", "Amount", "Category", "Every", "Next", "State"],
        &rows,
    );
    Ok(())
}

fn apply(context: &mut ShellContext) -> CommandResult {
    let today = context.today();
    let booked = RecurringService::apply_due(&mut context.data, today);
    if booked.is_empty() {
        io::print_info("Nothing due.");
        return Ok(());
    }
    context.persist()?;
    output_section("Booked");
    let rows: Vec<&Transaction> = booked.iter().collect();
    transaction::print_rows(&rows);
    io::print_success(format!("{} transaction(s) booked.", booked.len()));
    Ok(())
}

fn set_active(context: &mut ShellContext, args: &[&str], active: bool) -> CommandResult {
    let key = context.require(
        (!args.is_empty()).then(|| args.join(" ")).as_deref(),
        "recurring series",
        USAGE,
    )?;
    let id = find(context, &key)?;
    RecurringService::set_active(&mut context.data, id, active)?;
    context.persist()?;
    io::print_success(if active { "Series resumed." } else { "Series paused." });
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "recurring series", USAGE)?;
    let id = find(context, &key)?;
    if !context.confirm("Remove this recurring series?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = RecurringService::remove(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("Series `{}` removed.", removed.description));
    Ok(())
}

fn find(context: &ShellContext, key: &str) -> Result<Uuid, CommandError> {
    resolve_id(
        &context.data.recurring,
        key,
        |series| series.id,
        |series| series.description.as_str(),
        "recurring series",
    )
}
