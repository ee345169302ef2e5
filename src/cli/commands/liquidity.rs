use uuid::Uuid;

use crate::analytics::LiquiditySnapshot;
use crate::cli::commands::{project, unknown_subcommand};
use crate::cli::core::{
    parse_amount, parse_choice, parse_date, resolve_id, short_id, Args, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::LiquidityService;
use crate::domain::{Payable, ProbabilityLevel, Receivable, UrgencyLevel};

const PAYABLE_USAGE: &str = "payable <add|list|paid|unpaid|remove> ...\n  \
    payable add <title> <amount> <due date> [--creditor C]\n  \
    payable paid <payable>\n  \
    payable remove <payable>";

const RECEIVABLE_USAGE: &str = "receivable <add|list|received|pending|remove> ...\n  \
    receivable add <title> <amount> <expected date> [--probability confirmed|likely|uncertain] [--debtor D] [--project P]\n  \
    receivable received <receivable>\n  \
    receivable remove <receivable>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "payable",
            "Bills and obligations you owe",
            PAYABLE_USAGE,
            cmd_payable,
        ),
        CommandEntry::new(
            "receivable",
            "Money you expect to receive",
            RECEIVABLE_USAGE,
            cmd_receivable,
        ),
        CommandEntry::new(
            "liquidity",
            "Cash now versus weighted receivables and open payables",
            "liquidity",
            cmd_liquidity,
        ),
    ]
}

fn cmd_payable(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list_payables(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add_payable(context, rest),
        "list" | "ls" => list_payables(context),
        "paid" => mark_payable(context, rest, true),
        "unpaid" => mark_payable(context, rest, false),
        "remove" | "rm" => remove_payable(context, rest),
        other => Err(unknown_subcommand("payable", other, PAYABLE_USAGE)),
    }
}

fn cmd_receivable(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list_receivables(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add_receivable(context, rest),
        "list" | "ls" => list_receivables(context),
        "received" => mark_receivable(context, rest, true),
        "pending" => mark_receivable(context, rest, false),
        "remove" | "rm" => remove_receivable(context, rest),
        other => Err(unknown_subcommand("receivable", other, RECEIVABLE_USAGE)),
    }
}

fn add_payable(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let title = context.require(args.get(0), "title", PAYABLE_USAGE)?;
    let amount = parse_amount(&context.require(args.get(1), "amount", PAYABLE_USAGE)?)?;
    let due = parse_date(
        &context.require(args.get(2), "due date", PAYABLE_USAGE)?,
        context.today(),
    )?;
    let mut payable = Payable::new(title, amount, due);
    if let Some(creditor) = args.option("creditor") {
        payable.creditor = creditor.to_string();
    }
    LiquidityService::add_payable(&mut context.data, payable)?;
    context.persist()?;
    io::print_success(format!("Payable of {} due {due} added.", context.money(amount)));
    Ok(())
}

fn list_payables(context: &mut ShellContext) -> CommandResult {
    let today = context.today();
    output_section("Payables");
    if context.data.payables.is_empty() {
        io::print_info("Nothing owed. Use `payable add`.");
        return Ok(());
    }
    let mut payables: Vec<&Payable> = context.data.payables.iter().collect();
    payables.sort_by_key(|payable| (payable.is_paid, payable.due_date));
    let rows: Vec<Vec<String>> = payables
        .iter()
        .map(|payable| {
            vec![
                short_id(payable.id),
                payable.title.clone(),
                payable.creditor.clone(),
                context.money(payable.amount),
                payable.due_date.to_string(),
                urgency_label(payable.urgency(today), payable.days_until_due(today)),
            ]
        })
        .collect();
    table(&["Id", "Title", "Creditor", "Amount", "Due", "Urgency"], &rows);
    Ok(())
}

fn mark_payable(context: &mut ShellContext, args: &[&str], paid: bool) -> CommandResult {
    let key = context.require(
        (!args.is_empty()).then(|| args.join(" ")).as_deref(),
        "payable",
        PAYABLE_USAGE,
    )?;
    let id = find_payable(context, &key)?;
    LiquidityService::mark_paid(&mut context.data, id, paid)?;
    context.persist()?;
    io::print_success(if paid {
        "Payable marked as paid."
    } else {
        "Payable reopened."
    });
    Ok(())
}

fn remove_payable(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "payable", PAYABLE_USAGE)?;
    let id = find_payable(context, &key)?;
    if !context.confirm("Remove this payable?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = LiquidityService::remove_payable(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("Payable `{}` removed.", removed.title));
    Ok(())
}

fn add_receivable(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let title = context.require(args.get(0), "title", RECEIVABLE_USAGE)?;
    let amount = parse_amount(&context.require(args.get(1), "amount", RECEIVABLE_USAGE)?)?;
    let expected = parse_date(
        &context.require(args.get(2), "expected date", RECEIVABLE_USAGE)?,
        context.today(),
    )?;
    let probability = args
        .option("probability")
        .map(parse_choice::<ProbabilityLevel>)
        .transpose()?
        .unwrap_or_default();

    let mut receivable = Receivable::new(title, amount, expected, probability);
    if let Some(debtor) = args.option("debtor") {
        receivable.debtor = debtor.to_string();
    }
    if let Some(key) = args.option("project") {
        receivable.project_id = Some(project::find(context, key)?);
    }
    let weighted = receivable.weighted_amount();
    LiquidityService::add_receivable(&mut context.data, receivable)?;
    context.persist()?;
    io::print_success(format!(
        "Receivable of {} added ({} weighted).",
        context.money(amount),
        context.money(weighted)
    ));
    Ok(())
}

fn list_receivables(context: &mut ShellContext) -> CommandResult {
    output_section("Receivables");
    if context.data.receivables.is_empty() {
        io::print_info("Nothing expected. Use `receivable add`.");
        return Ok(());
    }
    let mut receivables: Vec<&Receivable> = context.data.receivables.iter().collect();
    receivables.sort_by_key(|receivable| (receivable.is_received, receivable.expected_date));
    let rows: Vec<Vec<String>> = receivables
        .iter()
        .map(|receivable| {
            let project = receivable
                .project_id
                .and_then(|id| context.data.project(id))
                .map(|project| project.name.clone())
                .unwrap_or_default();
            vec![
                short_id(receivable.id),
                receivable.title.clone(),
                receivable.debtor.clone(),
                project,
                context.money(receivable.amount),
                receivable.expected_date.to_string(),
                if receivable.is_received {
                    "Received".to_string()
                } else {
                    format!("{}%", receivable.confidence_percent())
                },
            ]
        })
        .collect();
    table(
        &["Id", "Title", "Debtor", "Project", "Amount", "Expected", "Confidence"],
        &rows,
    );
    Ok(())
}

fn mark_receivable(context: &mut ShellContext, args: &[&str], received: bool) -> CommandResult {
    let key = context.require(
        (!args.is_empty()).then(|| args.join(" ")).as_deref(),
        "receivable",
        RECEIVABLE_USAGE,
    )?;
    let id = find_receivable(context, &key)?;
    LiquidityService::mark_received(&mut context.data, id, received)?;
    context.persist()?;
    io::print_success(if received {
        "Receivable marked as received."
    } else {
        "Receivable reopened."
    });
    Ok(())
}

fn remove_receivable(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "receivable", RECEIVABLE_USAGE)?;
    let id = find_receivable(context, &key)?;
    if !context.confirm("Remove this receivable?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = LiquidityService::remove_receivable(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("Receivable `{}` removed.", removed.title));
    Ok(())
}

fn cmd_liquidity(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let today = context.today();
    let snapshot = LiquiditySnapshot::build(&context.data, today);

    output_section("Liquidity");
    io::print_info(format!("  Cash on hand        : {}", context.money(snapshot.current_cash)));
    io::print_info(format!(
        "  Open payables       : {} ({})",
        context.money(snapshot.total_payables),
        snapshot.payables.len()
    ));
    io::print_info(format!(
        "  Weighted receivable : {} ({})",
        context.money(snapshot.total_receivables),
        snapshot.receivables.len()
    ));
    io::print_info(format!(
        "  Projected balance   : {}",
        context.money(snapshot.projected_balance)
    ));
    if snapshot.projected_balance < 0.0 {
        io::print_warning("Projected balance is negative.");
    }
    if snapshot.overdue_count > 0 {
        io::print_warning(format!("{} payable(s) overdue.", snapshot.overdue_count));
    }
    if snapshot.critical_count > 0 {
        io::print_hint(format!(
            "{} payable(s) due within a week.",
            snapshot.critical_count
        ));
    }
    Ok(())
}

fn urgency_label(urgency: UrgencyLevel, days: i64) -> String {
    match urgency {
        UrgencyLevel::Paid => "Paid".to_string(),
        UrgencyLevel::Overdue => format!("Overdue ({}d)", -days),
        other => format!("{other} ({days}d)"),
    }
}

fn find_payable(context: &ShellContext, key: &str) -> Result<Uuid, CommandError> {
    resolve_id(
        &context.data.payables,
        key,
        |payable| payable.id,
        |payable| payable.title.as_str(),
        "payable",
    )
}

fn find_receivable(context: &ShellContext, key: &str) -> Result<Uuid, CommandError> {
    resolve_id(
        &context.data.receivables,
        key,
        |receivable| receivable.id,
        |receivable| receivable.title.as_str(),
        "receivable",
    )
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use crate::domain::ProbabilityLevel;
    use tempfile::TempDir;

    #[test]
    fn payables_can_be_settled() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "payable add Rent 1200 2024-04-01 --creditor Landlord",
                "payable add Internet 40 2024-04-05",
                "payable paid rent",
                "payable remove Internet",
            ],
        );
        let payables = &context.data().payables;
        assert_eq!(payables.len(), 1);
        assert!(payables[0].is_paid);
        assert_eq!(payables[0].creditor, "Landlord");
    }

    #[test]
    fn receivable_links_project_and_probability() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "project add Website 5000",
                "receivable add \"Invoice 7\" 2000 2024-05-01 --probability uncertain --project website",
                "receivable add Refund 50 2024-05-02 --probability bogus",
            ],
        );
        let data = context.data();
        assert_eq!(data.receivables.len(), 1);
        let receivable = &data.receivables[0];
        assert_eq!(receivable.probability, ProbabilityLevel::Uncertain);
        assert_eq!(receivable.project_id, Some(data.projects[0].id));
        assert_eq!(receivable.weighted_amount(), 800.0);
    }
}
