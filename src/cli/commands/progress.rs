use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{progress_bar, section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::AchievementService;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "level",
            "Show level, XP and progress to the next level",
            "level",
            cmd_level,
        ),
        CommandEntry::new(
            "stats",
            "Activity statistics and achievement progress",
            "stats [locked|unlocked]",
            cmd_stats,
        ),
    ]
}

fn cmd_level(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let level = &context.data.level;
    output_section(format!("Level {}", level.level));
    io::print_info(format!(
        "  {} {:.0}%",
        progress_bar(level.progress_percent(), 30),
        level.progress_percent()
    ));
    io::print_info(format!(
        "  {} / {} XP this level, {} XP total",
        level.current_level_xp, level.xp_to_next_level, level.total_xp
    ));
    if let Some(at) = level.last_level_up {
        io::print_info(format!("  Last level up: {}", at.format("%Y-%m-%d")));
    }
    let streak = AchievementService::longest_habit_streak(&context.data);
    if streak > 0 {
        io::print_info(format!("  Longest habit streak: {streak} day(s)"));
    }
    Ok(())
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let data = &context.data;
    let tasks_done: usize = data
        .daily_entries
        .iter()
        .map(|entry| entry.completed_tasks())
        .sum();
    output_section("Statistics");
    io::print_info(format!("  Transactions recorded : {}", data.transactions.len()));
    io::print_info(format!("  Tasks completed       : {tasks_done}"));
    io::print_info(format!("  Days journaled        : {}", data.daily_entries.len()));
    io::print_info(format!(
        "  Longest habit streak  : {}",
        AchievementService::longest_habit_streak(data)
    ));

    let filter = args.first().map(|value| value.to_ascii_lowercase());
    let rows: Vec<Vec<String>> = context
        .data
        .achievements
        .iter()
        .filter(|achievement| match filter.as_deref() {
            Some("locked") => !achievement.is_unlocked,
            Some("unlocked") => achievement.is_unlocked,
            _ => true,
        })
        .map(|achievement| {
            vec![
                achievement.icon.clone(),
                achievement.title.clone(),
                achievement.description.clone(),
                if achievement.is_unlocked {
                    achievement
                        .unlocked_date
                        .map(|at| at.format("%Y-%m-%d").to_string())
                        .unwrap_or_else(|| "Unlocked".into())
                } else {
                    format!(
                        "{} {:.0}/{:.0}",
                        progress_bar(achievement.progress_percent(), 10),
                        achievement.current,
                        achievement.target
                    )
                },
            ]
        })
        .collect();

    let unlocked = context
        .data
        .achievements
        .iter()
        .filter(|achievement| achievement.is_unlocked)
        .count();
    output_section(format!(
        "Achievements ({unlocked}/{})",
        context.data.achievements.len()
    ));
    if rows.is_empty() {
        io::print_info("Nothing to show.");
    } else {
        table(&["", "Title", "Goal", "Progress"], &rows);
    }
    Ok(())
}
