use chrono::NaiveDate;

use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{
    parse_number, parse_optional_date, resolve_id, Args, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::TrackerService;

const USAGE: &str = "daily <show|notes|mood|task|done|habit|check> ... [--date D]\n  \
    daily show [--date D]\n  \
    daily notes <text>\n  \
    daily mood <1-10>\n  \
    daily task <description> [--priority 1-5]\n  \
    daily done <task>\n  \
    daily habit <name>\n  \
    daily check <habit>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "daily",
        "Daily journal with mood, tasks and habits",
        USAGE,
        cmd_daily,
    )]
}

fn cmd_daily(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return show(context, &[]);
    };
    match sub.to_ascii_lowercase().as_str() {
        "show" | "today" => show(context, rest),
        "notes" | "note" => notes(context, rest),
        "mood" => mood(context, rest),
        "task" => task(context, rest),
        "done" => done(context, rest),
        "habit" => habit(context, rest),
        "check" => check(context, rest),
        other => Err(unknown_subcommand("daily", other, USAGE)),
    }
}

fn entry_date(context: &ShellContext, args: &Args<'_>) -> Result<NaiveDate, CommandError> {
    parse_optional_date(args.option("date"), context.today())
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let date = entry_date(context, &args)?;
    TrackerService::sync_habits(&mut context.data, date);
    let Some(entry) = TrackerService::find(&context.data, date) else {
        io::print_info(format!("Nothing recorded for {date}."));
        return Ok(());
    };

    output_section(format!("Journal {date}"));
    io::print_info(format!("  Mood  : {}/10", entry.mood));
    if !entry.notes.is_empty() {
        io::print_info(format!("  Notes : {}", entry.notes));
    }
    if entry.tasks.is_empty() {
        io::print_info("  No tasks. Use `daily task`.");
    } else {
        let mut tasks: Vec<_> = entry.tasks.iter().collect();
        tasks.sort_by_key(|task| (task.is_completed, std::cmp::Reverse(task.priority)));
        let rows: Vec<Vec<String>> = tasks
            .iter()
            .map(|task| {
                vec![
                    if task.is_completed { "x" } else { " " }.to_string(),
                    task.description.clone(),
                    format!("P{}", task.priority),
                    format!("{} XP", task.xp),
                ]
            })
            .collect();
        table(&["", "Task", "Prio", "Reward"], &rows);
    }
    if !entry.habits.is_empty() {
        let rows: Vec<Vec<String>> = entry
            .habits
            .iter()
            .map(|habit| {
                vec![
                    if habit.is_completed { "x" } else { " " }.to_string(),
                    habit.name.clone(),
                ]
            })
            .collect();
        table(&["", "Habit"], &rows);
    }
    Ok(())
}

fn notes(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let date = entry_date(context, &args)?;
    let text = args.rest(0).unwrap_or_default();
    TrackerService::set_notes(&mut context.data, date, &text)?;
    context.persist()?;
    io::print_success("Notes saved.");
    Ok(())
}

fn mood(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let date = entry_date(context, &args)?;
    let value: u8 = parse_number(&context.require(args.get(0), "mood (1-10)", USAGE)?, "mood")?;
    TrackerService::set_mood(&mut context.data, date, value)?;
    context.persist()?;
    io::print_success(format!("Mood set to {value}/10."));
    Ok(())
}

fn task(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let date = entry_date(context, &args)?;
    let description = context.require(args.rest(0).as_deref(), "task description", USAGE)?;
    let priority = args
        .option("priority")
        .map(|value| parse_number::<u8>(value, "priority"))
        .transpose()?
        .unwrap_or(3);
    let task = TrackerService::add_task(&mut context.data, date, &description, priority)?;
    context.persist()?;
    io::print_success(format!("Task added (worth {} XP).", task.xp));
    Ok(())
}

fn done(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let date = entry_date(context, &args)?;
    let key = context.require(args.rest(0).as_deref(), "task", USAGE)?;
    let task_id = {
        let tasks = TrackerService::find(&context.data, date)
            .map(|entry| entry.tasks.as_slice())
            .unwrap_or_default();
        resolve_id(
            tasks,
            &key,
            |task| task.id,
            |task| task.description.as_str(),
            "task",
        )?
    };
    let now = context.now();
    let toggle = TrackerService::toggle_task(&mut context.data, date, task_id, now)?;
    context.persist()?;
    io::print_success(if toggle.completed {
        "Task completed."
    } else {
        "Task reopened."
    });
    if let Some(award) = &toggle.award {
        context.report_award(award);
    }
    Ok(())
}

fn habit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let date = entry_date(context, &args)?;
    let name = context.require(args.rest(0).as_deref(), "habit name", USAGE)?;
    TrackerService::add_habit(&mut context.data, date, &name)?;
    context.persist()?;
    io::print_success(format!("Habit `{name}` is now tracked daily."));
    Ok(())
}

fn check(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let date = entry_date(context, &args)?;
    let name = context.require(args.rest(0).as_deref(), "habit", USAGE)?;
    TrackerService::sync_habits(&mut context.data, date);
    let now = context.now();
    let toggle = TrackerService::toggle_habit(&mut context.data, date, &name, now)?;
    context.persist()?;
    io::print_success(if toggle.completed {
        "Habit checked."
    } else {
        "Habit unchecked."
    });
    if let Some(award) = &toggle.award {
        context.report_award(award);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use tempfile::TempDir;

    #[test]
    fn tasks_pay_xp_once() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "daily task Write report --priority 2 --date 2024-03-01",
                "daily done \"write report\" --date 2024-03-01",
                "daily done \"write report\" --date 2024-03-01",
                "daily done \"write report\" --date 2024-03-01",
            ],
        );
        let data = context.data();
        let entry = &data.daily_entries[0];
        assert!(entry.tasks[0].is_completed);
        assert!(entry.tasks[0].xp_claimed);
        let task_awards = data.level.total_xp;
        assert!(task_awards >= 50);
    }

    #[test]
    fn habits_sync_onto_new_days() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "daily habit Reading --date 2024-03-01",
                "daily check reading --date 2024-03-02",
                "daily mood 8 --date 2024-03-02",
                "daily mood 11 --date 2024-03-02",
                "daily notes Quiet day --date 2024-03-02",
            ],
        );
        let data = context.data();
        assert_eq!(data.habits, vec!["Reading".to_string()]);
        let second = data
            .daily_entries
            .iter()
            .find(|entry| entry.date.to_string() == "2024-03-02")
            .expect("second day");
        assert!(second.habits[0].is_completed);
        assert_eq!(second.mood, 8);
        assert_eq!(second.notes, "Quiet day");
    }

    #[test]
    fn unknown_habit_on_empty_day_records_nothing() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &["daily check Stretching --date 2024-03-05", "daily show --date 2024-03-05"],
        );
        assert!(context.data().daily_entries.is_empty());
    }
}
