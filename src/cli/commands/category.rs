use crate::analytics::category_totals;
use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{parse_choice, Args, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::CategoryService;
use crate::domain::{Category, CategoryKind};

const USAGE: &str = "category <add|list|remove|totals> ...\n  \
    category add <name> <income|expense> [--icon I]\n  \
    category list [income|expense]\n  \
    category remove <name>\n  \
    category totals";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "category",
        "Manage income and expense categories",
        USAGE,
        cmd_category,
    )]
}

fn cmd_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context, &[]);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context, rest),
        "remove" | "rm" => remove(context, rest),
        "totals" => totals(context),
        other => Err(unknown_subcommand("category", other, USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let name = context.require(args.get(0), "category name", USAGE)?;
    let kind: CategoryKind = parse_choice(&context.require(args.get(1), "category type", USAGE)?)?;
    let icon = args.option("icon").unwrap_or_default();
    CategoryService::add(&mut context.data, Category::new(name.as_str(), kind, icon))?;
    context.persist()?;
    io::print_success(format!("{kind} category `{}` added.", name.trim()));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = args
        .first()
        .map(|value| parse_choice::<CategoryKind>(value))
        .transpose()?;
    output_section("Categories");
    let rows: Vec<Vec<String>> = CategoryService::list(&context.data, kind)
        .into_iter()
        .map(|category| {
            vec![
                category.icon.clone(),
                category.name.clone(),
                category.kind.to_string(),
            ]
        })
        .collect();
    if rows.is_empty() {
        io::print_info("No categories.");
    } else {
        table(&["", "Name", "Type"], &rows);
    }
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = context.require(args.first().copied(), "category name", USAGE)?;
    let removed = CategoryService::remove(&mut context.data, &name)?;
    context.persist()?;
    io::print_success(format!("Category `{}` removed.", removed.name));
    Ok(())
}

fn totals(context: &mut ShellContext) -> CommandResult {
    output_section("Spending by category");
    let totals = category_totals(&context.data);
    if totals.is_empty() {
        io::print_info("No expenses recorded.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = totals
        .iter()
        .map(|entry| vec![entry.category.clone(), context.money(entry.total)])
        .collect();
    table(&["Category", "Total"], &rows);
    Ok(())
}
