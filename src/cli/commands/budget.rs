use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{
    parse_amount, parse_optional_date, resolve_id, short_id, Args, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{progress_bar, section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::BudgetService;
use crate::currency::format_money;

const USAGE: &str = "budget <add|list|remove> ...\n  \
    budget add <category> <amount> [--start D] [--currency C]\n  \
    budget list\n  \
    budget remove <budget>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "budget",
        "Monthly spending caps per expense category",
        USAGE,
        cmd_budget,
    )]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context),
        "remove" | "rm" => remove(context, rest),
        other => Err(unknown_subcommand("budget", other, USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let category = context.require(args.get(0), "category", USAGE)?;
    let amount = parse_amount(&context.require(args.get(1), "amount", USAGE)?)?;
    let start = parse_optional_date(args.option("start"), context.today())?;
    let currency = args
        .option("currency")
        .map(str::to_string)
        .unwrap_or_else(|| context.base_currency());
    BudgetService::add(&mut context.data, &category, amount, &currency, start)?;
    context.persist()?;
    io::print_success(format!(
        "Budget of {} for {category} starting {start}.",
        format_money(amount, &currency)
    ));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    output_section("Budgets");
    let progress = BudgetService::progress(&context.data);
    if progress.is_empty() {
        io::print_info("No budgets. Use `budget add`.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = progress
        .iter()
        .map(|entry| {
            let budget = &entry.budget;
            vec![
                short_id(budget.id),
                budget.category.clone(),
                format!("{} - {}", budget.start_date, budget.end_date),
                format!(
                    "{} / {}",
                    format_money(entry.spent, &budget.currency),
                    format_money(budget.amount, &budget.currency)
                ),
                format!("{} {:.0}%", progress_bar(entry.percent, 12), entry.percent),
            ]
        })
        .collect();
    table(&["Id", "Category", "Window", "Spent", "Progress"], &rows);
    for entry in progress.iter().filter(|entry| entry.over_budget) {
        io::print_warning(format!(
            "{} is over budget by {}.",
            entry.budget.category,
            format_money(-entry.remaining, &entry.budget.currency)
        ));
    }
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "budget", USAGE)?;
    let id = resolve_id(
        &context.data.budgets,
        &key,
        |budget| budget.id,
        |budget| budget.category.as_str(),
        "budget",
    )?;
    let removed = BudgetService::remove(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("Budget for {} removed.", removed.category));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use crate::core::services::BudgetService;
    use tempfile::TempDir;

    #[test]
    fn budget_tracks_spending_in_window() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "budget add food 300 --start 2024-01-01",
                "budget add Salary 300 --start 2024-01-01",
                "txn add expense 120 Food Groceries --date 2024-01-15",
                "txn add expense 80 Food Lunch --date 2024-03-15",
            ],
        );
        let progress = BudgetService::progress(context.data());
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].budget.category, "Food");
        assert_eq!(progress[0].spent, 120.0);
        assert_eq!(progress[0].percent, 40.0);
        assert!(!progress[0].over_budget);
    }

    #[test]
    fn remove_by_category_name() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &["budget add Food 300", "budget remove food"],
        );
        assert!(context.data().budgets.is_empty());
    }
}
