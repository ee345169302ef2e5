use crate::analytics::{Dashboard, LiquiditySnapshot, ProjectForecast};
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{progress_bar, section as output_section};
use crate::cli::registry::CommandEntry;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "summary",
        "Overview of net worth, cash flow, level and obligations",
        "summary",
        cmd_summary,
    )]
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let today = context.today();
    let data = &context.data;
    let dashboard = Dashboard::build(data, today);
    let liquidity = LiquiditySnapshot::build(data, today);
    let forecast = ProjectForecast::build(&data.projects);
    let level = &data.level;

    output_section("Summary");
    io::print_info(format!("  Net worth       : {}", context.money(dashboard.net_worth)));
    io::print_info(format!("  Income (30d)    : {}", context.money(dashboard.income)));
    io::print_info(format!("  Expenses (30d)  : {}", context.money(dashboard.expense)));
    io::print_info(format!("  Savings rate    : {:.1}%", dashboard.savings_rate));
    io::print_info(format!(
        "  Level {:<3}       : {} {}/{} XP",
        level.level,
        progress_bar(level.progress_percent(), 20),
        level.current_level_xp,
        level.xp_to_next_level
    ));
    io::print_info(format!(
        "  Open payables   : {} ({} overdue)",
        context.money(liquidity.total_payables),
        liquidity.overdue_count
    ));
    io::print_info(format!(
        "  Active projects : {} ({} outstanding)",
        forecast.active_projects,
        context.money(forecast.outstanding)
    ));
    io::print_info(format!("  Transactions    : {}", data.transactions.len()));
    Ok(())
}
