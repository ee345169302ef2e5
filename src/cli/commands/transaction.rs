use crate::analytics::AnalysisPeriod;
use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{
    parse_amount, parse_choice, parse_number, parse_optional_date, resolve_id, short_id, Args,
    CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::TransactionService;
use crate::currency::format_money;
use crate::domain::{Transaction, TransactionKind};

const USAGE: &str = "txn <add|list|remove|search> ...\n  \
    txn add <income|expense> <amount> <category> <description> [--date D] [--currency C] [--project P] [--notes N]\n  \
    txn list [--period 7d|30d|90d|1y] [--category C] [--limit N]\n  \
    txn remove <id>\n  \
    txn search <text>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "txn",
        "Record, list, search and remove transactions",
        USAGE,
        cmd_txn,
    )]
}

fn cmd_txn(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context, &[]);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context, rest),
        "remove" | "rm" => remove(context, rest),
        "search" | "find" => search(context, rest),
        other => Err(unknown_subcommand("txn", other, USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let kind: TransactionKind =
        parse_choice(&context.require(args.get(0), "type (income/expense)", USAGE)?)?;
    let amount = parse_amount(&context.require(args.get(1), "amount", USAGE)?)?;
    let category = context.require(args.get(2), "category", USAGE)?;
    let description = context.require(args.rest(3).as_deref(), "description", USAGE)?;
    let date = parse_optional_date(args.option("date"), context.today())?;

    let category = context
        .data
        .category(&category)
        .map(|known| known.name.clone())
        .unwrap_or(category);
    let currency = args
        .option("currency")
        .map(str::to_string)
        .unwrap_or_else(|| context.base_currency());
    let mut transaction =
        Transaction::new(description, amount, kind, category, date).with_currency(currency);
    if let Some(project) = args.option("project") {
        transaction = transaction.with_project(project);
    }
    if let Some(notes) = args.option("notes") {
        transaction.notes = notes.to_string();
    }

    if context.data.category(&transaction.category).is_none() {
        io::print_warning(format!(
            "Category `{}` is not defined; add it with `category add`.",
            transaction.category
        ));
    }
    let summary = format!(
        "{} {} in {}",
        transaction.kind,
        format_money(transaction.amount, &transaction.currency),
        transaction.category
    );
    let id = TransactionService::add(&mut context.data, transaction)?;
    context.persist()?;
    io::print_success(format!("Recorded {summary} [{}].", short_id(id)));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let today = context.today();
    let mut rows: Vec<&Transaction> = match args.option("period") {
        Some(code) => parse_choice::<AnalysisPeriod>(code)?.filter(&context.data.transactions, today),
        None => context.data.transactions.iter().collect(),
    };
    if let Some(category) = args.option("category") {
        rows.retain(|txn| txn.category.eq_ignore_ascii_case(category));
    }
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = args.option("limit") {
        rows.truncate(parse_number::<usize>(limit, "limit")?);
    }

    output_section("Transactions");
    if rows.is_empty() {
        io::print_info("No transactions recorded.");
        return Ok(());
    }
    print_rows(&rows);
    let totals = TransactionService::totals(rows.iter().copied());
    io::print_info(format!(
        "Income {} | Expenses {} | Balance {}",
        context.money(totals.income),
        context.money(totals.expense),
        context.money(totals.balance())
    ));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "transaction id", USAGE)?;
    let id = resolve_id(
        &context.data.transactions,
        &key,
        |txn| txn.id,
        |txn| txn.description.as_str(),
        "transaction",
    )?;
    if !context.confirm("Remove this transaction?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = TransactionService::remove(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("Removed `{}`.", removed.description));
    Ok(())
}

fn search(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let needle = context.require(
        (!args.is_empty()).then(|| args.join(" ")).as_deref(),
        "search text",
        USAGE,
    )?;
    let mut hits = TransactionService::search(&context.data, &needle);
    hits.sort_by(|a, b| b.date.cmp(&a.date));
    output_section(format!("Search: {needle}"));
    if hits.is_empty() {
        io::print_info("No matching transactions.");
    } else {
        print_rows(&hits);
        io::print_info(format!("{} match(es).", hits.len()));
    }
    Ok(())
}

pub(crate) fn print_rows(rows: &[&Transaction]) {
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|txn| {
            vec![
                short_id(txn.id),
                txn.date.to_string(),
                txn.kind.to_string(),
                format_money(txn.signed_amount(), &txn.currency),
                txn.category.clone(),
                txn.description.clone(),
            ]
        })
        .collect();
    table(
        &["Id", "Date", "Type", "Amount", "Category", "Description"],
        &body,
    );
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use crate::domain::TransactionKind;
    use tempfile::TempDir;

    #[test]
    fn add_uses_known_category_casing_and_options() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &["txn add income 1500 salary \"March pay\" --date 2024-03-31 --currency usd --notes bonus"],
        );
        let txn = &context.data().transactions[0];
        assert_eq!(txn.kind, TransactionKind::Income);
        assert_eq!(txn.category, "Salary");
        assert_eq!(txn.currency, "USD");
        assert_eq!(txn.notes, "bonus");
        assert_eq!(txn.date.to_string(), "2024-03-31");
    }

    #[test]
    fn invalid_amount_is_not_recorded() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &["txn add expense -5 Food Snacks", "txn add expense abc Food Snacks"],
        );
        assert!(context.data().transactions.is_empty());
    }

    #[test]
    fn remove_by_description() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "txn add expense 12 Food Coffee",
                "txn add expense 30 Food Dinner",
                "txn remove coffee",
            ],
        );
        let remaining: Vec<_> = context
            .data()
            .transactions
            .iter()
            .map(|txn| txn.description.as_str())
            .collect();
        assert_eq!(remaining, vec!["Dinner"]);
    }
}
