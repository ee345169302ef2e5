use crate::analytics::{
    top_categories, AnalysisPeriod, CorrelationService, Dashboard, MonthlyComparison,
    ProjectAnalysis, ProjectForecast, SankeyService,
};
use crate::analytics::correlation::DEFAULT_POINTS;
use crate::cli::commands::{transaction, unknown_subcommand};
use crate::cli::core::{parse_choice, parse_number, Args, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{progress_bar, section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::domain::{Transaction, TransactionKind};

const USAGE: &str = "analytics <dashboard|monthly|sankey|correlation|projects> ...\n  \
    analytics dashboard\n  \
    analytics monthly\n  \
    analytics sankey [--period 7d|30d|90d|1y]\n  \
    analytics correlation [--points N]\n  \
    analytics projects";

const TOP_LIMIT: usize = 5;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "analytics",
        "Dashboards, monthly comparison, money flow and correlations",
        USAGE,
        cmd_analytics,
    )]
}

fn cmd_analytics(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return dashboard(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "dashboard" => dashboard(context),
        "monthly" => monthly(context),
        "sankey" | "flow" => sankey(context, rest),
        "correlation" => correlation(context, rest),
        "projects" => projects(context),
        other => Err(unknown_subcommand("analytics", other, USAGE)),
    }
}

fn dashboard(context: &mut ShellContext) -> CommandResult {
    let dashboard = Dashboard::build(&context.data, context.today());
    let forecast = ProjectForecast::build(&context.data.projects);

    output_section("Dashboard (last 30 days)");
    io::print_info(format!("  Net worth    : {}", context.money(dashboard.net_worth)));
    io::print_info(format!("  Income       : {}", context.money(dashboard.income)));
    io::print_info(format!("  Expenses     : {}", context.money(dashboard.expense)));
    io::print_info(format!("  Savings rate : {:.1}%", dashboard.savings_rate));
    if forecast.active_projects > 0 {
        io::print_info(format!(
            "  Projects     : {} active, {} still expected",
            forecast.active_projects,
            context.money(forecast.outstanding)
        ));
    }

    if !dashboard.top_expenses.is_empty() {
        output_section("Top expenses");
        let rows: Vec<Vec<String>> = dashboard
            .top_expenses
            .iter()
            .map(|entry| {
                let share = if dashboard.expense > 0.0 {
                    entry.total / dashboard.expense * 100.0
                } else {
                    0.0
                };
                vec![
                    entry.category.clone(),
                    context.money(entry.total),
                    format!("{} {share:.0}%", progress_bar(share, 12)),
                ]
            })
            .collect();
        table(&["Category", "Total", "Share"], &rows);
    }
    if !dashboard.recent.is_empty() {
        output_section("Recent");
        let recent: Vec<&Transaction> = dashboard.recent.iter().collect();
        transaction::print_rows(&recent);
    }
    Ok(())
}

fn monthly(context: &mut ShellContext) -> CommandResult {
    let today = context.today();
    let comparison = MonthlyComparison::build(&context.data.transactions, today);

    output_section("This month vs last month");
    let rows = vec![
        vec![
            "Income".to_string(),
            context.money(comparison.current.income),
            context.money(comparison.previous.income),
            format!("{:+.1}%", comparison.income_change),
        ],
        vec![
            "Expenses".to_string(),
            context.money(comparison.current.expense),
            context.money(comparison.previous.expense),
            format!("{:+.1}%", comparison.expense_change),
        ],
        vec![
            "Balance".to_string(),
            context.money(comparison.current.balance()),
            context.money(comparison.previous.balance()),
            String::new(),
        ],
    ];
    table(&["", "Current", "Previous", "Change"], &rows);

    for (kind, title) in [
        (TransactionKind::Income, "Top income sources"),
        (TransactionKind::Expense, "Top spending"),
    ] {
        let top = top_categories(&context.data.transactions, kind, today, TOP_LIMIT);
        if top.is_empty() {
            continue;
        }
        output_section(title);
        let rows: Vec<Vec<String>> = top
            .iter()
            .map(|entry| vec![entry.category.clone(), context.money(entry.total)])
            .collect();
        table(&["Category", "Total"], &rows);
    }
    Ok(())
}

fn sankey(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let period = args
        .option("period")
        .map(parse_choice::<AnalysisPeriod>)
        .transpose()?
        .unwrap_or(context.config.analytics_period);
    let window = period.filter(&context.data.transactions, context.today());
    let diagram = SankeyService::generate(window, context.config.sankey_canvas_height);

    output_section(format!("Money flow ({period})"));
    if diagram.is_empty() {
        io::print_info("No transactions in this period.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = diagram
        .links
        .iter()
        .filter_map(|link| {
            let source = diagram.nodes.get(link.source)?;
            let target = diagram.nodes.get(link.target)?;
            Some(vec![
                source.name.clone(),
                target.name.clone(),
                context.money(link.amount),
            ])
        })
        .collect();
    table(&["From", "To", "Amount"], &rows);
    Ok(())
}

fn correlation(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let points = args
        .option("points")
        .map(|value| parse_number::<usize>(value, "points"))
        .transpose()?
        .unwrap_or(DEFAULT_POINTS);
    let report = CorrelationService::report(&context.data, points);

    output_section("Asset correlation");
    if report.is_empty() {
        io::print_info("Add investments to see how they move together.");
        return Ok(());
    }
    let mut headers: Vec<&str> = vec![""];
    headers.extend(report.assets.iter().map(String::as_str));
    let rows: Vec<Vec<String>> = report
        .assets
        .iter()
        .map(|row| {
            let mut cells = vec![row.clone()];
            cells.extend(report.assets.iter().map(|column| {
                report
                    .cells
                    .iter()
                    .find(|cell| &cell.row == row && &cell.column == column)
                    .map(|cell| format!("{:+.2}", cell.value))
                    .unwrap_or_default()
            }));
            cells
        })
        .collect();
    table(&headers, &rows);

    for cell in report
        .cells
        .iter()
        .filter(|cell| cell.row < cell.column && cell.value < -0.4)
    {
        io::print_hint(format!(
            "{} and {} tend to move apart ({}).",
            cell.row, cell.column, cell.strength
        ));
    }
    Ok(())
}

fn projects(context: &mut ShellContext) -> CommandResult {
    let analysis = ProjectAnalysis::build(&context.data.projects);
    output_section("Project profitability");
    if analysis.projects.is_empty() {
        io::print_info("No projects yet.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = analysis
        .projects
        .iter()
        .map(|pnl| {
            vec![
                pnl.name.clone(),
                context.money(pnl.revenue),
                context.money(pnl.cost),
                context.money(pnl.profit),
                format!("{:.1}%", pnl.margin),
            ]
        })
        .collect();
    table(&["Project", "Revenue", "Cost", "Profit", "Margin"], &rows);
    io::print_info(format!(
        "{} project(s), {} completed. Total profit {} (average {}).",
        analysis.total_projects,
        analysis.completed,
        context.money(analysis.total_profit),
        context.money(analysis.average_profit)
    ));
    Ok(())
}
