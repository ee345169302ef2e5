use uuid::Uuid;

use crate::analytics::Wallet;
use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{
    parse_amount, parse_choice, parse_optional_date, resolve_id, short_id, Args, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::InvestmentService;
use crate::domain::{Investment, InvestmentKind};

const USAGE: &str = "investment <add|list|value|remove> ...\n  \
    investment add <name> <stock|crypto|bond|etf> <amount> [--value V] [--date D]\n  \
    investment value <investment> <current value>\n  \
    investment remove <investment>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "investment",
        "Track investment positions and their returns",
        USAGE,
        cmd_investment,
    )]
}

fn cmd_investment(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context),
        "value" | "revalue" => revalue(context, rest),
        "remove" | "rm" => remove(context, rest),
        other => Err(unknown_subcommand("investment", other, USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let name = context.require(args.get(0), "investment name", USAGE)?;
    let kind: InvestmentKind =
        parse_choice(&context.require(args.get(1), "investment type", USAGE)?)?;
    let amount = parse_amount(&context.require(args.get(2), "amount invested", USAGE)?)?;
    let current = args.option("value").map(parse_amount).transpose()?.unwrap_or(amount);
    let date = parse_optional_date(args.option("date"), context.today())?;
    let investment = Investment::new(name, kind, amount, current, date);
    let label = investment.name.clone();
    InvestmentService::add(&mut context.data, investment)?;
    context.persist()?;
    io::print_success(format!("Investment `{label}` added."));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    output_section("Investments");
    if context.data.investments.is_empty() {
        io::print_info("No investments yet. Use `investment add`.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = context
        .data
        .investments
        .iter()
        .map(|investment| {
            vec![
                short_id(investment.id),
                investment.name.clone(),
                investment.kind.to_string(),
                context.money(investment.amount),
                context.money(investment.current_value),
                format!("{:+.2}%", investment.return_percent()),
            ]
        })
        .collect();
    table(&["Id", "Name", "Type", "Invested", "Value", "Return"], &rows);
    let wallet = Wallet::build(&context.data);
    io::print_info(format!(
        "Invested {} | Value {} | Return {}",
        context.money(wallet.total_invested),
        context.money(wallet.total_current),
        context.money(wallet.total_return)
    ));
    Ok(())
}

fn revalue(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "investment", USAGE)?;
    let value = parse_amount(&context.require(args.get(1).copied(), "current value", USAGE)?)?;
    let id = find(context, &key)?;
    InvestmentService::revalue(&mut context.data, id, value)?;
    context.persist()?;
    io::print_success(format!("Current value set to {}.", context.money(value)));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "investment", USAGE)?;
    let id = find(context, &key)?;
    if !context.confirm("Remove this investment?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = InvestmentService::remove(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("Investment `{}` removed.", removed.name));
    Ok(())
}

fn find(context: &ShellContext, key: &str) -> Result<Uuid, CommandError> {
    resolve_id(
        &context.data.investments,
        key,
        |investment| investment.id,
        |investment| investment.name.as_str(),
        "investment",
    )
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use tempfile::TempDir;

    #[test]
    fn add_and_revalue() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "investment add \"Index Fund\" etf 1000 --date 2024-01-10",
                "investment value \"index fund\" 1250",
            ],
        );
        let investment = &context.data().investments[0];
        assert_eq!(investment.amount, 1000.0);
        assert_eq!(investment.current_value, 1250.0);
        assert_eq!(investment.return_percent(), 25.0);
    }
}
