use uuid::Uuid;

use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{
    parse_amount, parse_choice, parse_date, parse_number, parse_optional_date, resolve_id,
    short_id, Args, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{progress_bar, section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::ProjectService;
use crate::currency::format_money;
use crate::domain::{Project, ProjectExpense, ProjectMilestone, ProjectStatus};

const USAGE: &str = "project <add|list|show|edit|status|priority|notes|milestone|complete|expense|pay|remove> ...\n  \
    project add <name> <budget> [--client C] [--start D] [--deadline D] [--priority 1-5] [--currency C]\n  \
    project list [--status S]\n  \
    project show <project>\n  \
    project edit <project> [--name N] [--client C] [--budget B] [--expected E] [--deadline D]\n  \
    project status <project> <planned|in-progress|on-hold|completed|cancelled>\n  \
    project priority <project> <1-5>\n  \
    project notes <project> <text>\n  \
    project milestone <project> <name> <payment> [--due D]\n  \
    project complete <project> <milestone>\n  \
    project expense <project> <amount> <description> [--category C] [--date D]\n  \
    project pay <project> <amount> [description]\n  \
    project remove <project>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "project",
        "Run client projects, milestones, costs and payments",
        USAGE,
        cmd_project,
    )]
}

fn cmd_project(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context, &[]);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context, rest),
        "show" => show(context, rest),
        "edit" => edit(context, rest),
        "status" => status(context, rest),
        "priority" => priority(context, rest),
        "notes" => notes(context, rest),
        "milestone" => milestone(context, rest),
        "complete" => complete(context, rest),
        "expense" => expense(context, rest),
        "pay" | "payment" => pay(context, rest),
        "remove" | "rm" => remove(context, rest),
        other => Err(unknown_subcommand("project", other, USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let today = context.today();
    let name = context.require(args.get(0), "project name", USAGE)?;
    let budget = parse_amount(&context.require(args.get(1), "budget", USAGE)?)?;
    let start = parse_optional_date(args.option("start"), today)?;

    let mut project = Project::new(name.trim(), budget, start);
    if let Some(client) = args.option("client") {
        project = project.with_client(client);
    }
    if let Some(deadline) = args.option("deadline") {
        project = project.with_deadline(parse_date(deadline, today)?);
    }
    if let Some(priority) = args.option("priority") {
        project.priority = parse_number(priority, "priority")?;
    }
    project.currency = args
        .option("currency")
        .map(str::to_ascii_uppercase)
        .unwrap_or_else(|| context.base_currency());

    let label = project.name.clone();
    ProjectService::add(&mut context.data, project)?;
    context.persist()?;
    io::print_success(format!("Project `{label}` created."));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let filter = args
        .option("status")
        .map(parse_choice::<ProjectStatus>)
        .transpose()?;
    let today = context.today();

    output_section("Projects");
    let mut projects: Vec<&Project> = context
        .data
        .projects
        .iter()
        .filter(|project| filter.map_or(true, |status| project.status == status))
        .collect();
    if projects.is_empty() {
        io::print_info("No projects. Use `project add`.");
        return Ok(());
    }
    projects.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));

    let rows: Vec<Vec<String>> = projects
        .iter()
        .map(|project| {
            let deadline = match project.days_until_deadline(today) {
                Some(days) if days < 0 => format!("{} overdue", -days),
                Some(days) => format!("{days}d"),
                None => "-".to_string(),
            };
            vec![
                short_id(project.id),
                project.name.clone(),
                project.client.clone(),
                project.status.to_string(),
                format!("P{}", project.priority),
                format_money(project.received_amount, &project.currency),
                format_money(project.budget, &project.currency),
                deadline,
            ]
        })
        .collect();
    table(
        &["Id", "Name", "Client", "Status", "Prio", "Received", "Budget", "Deadline"],
        &rows,
    );
    Ok(())
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "project", USAGE)?;
    let id = find(context, &key)?;
    let Some(project) = context.data.projects.iter().find(|p| p.id == id) else {
        return Ok(());
    };
    let money = |amount: f64| format_money(amount, &project.currency);

    output_section(format!("Project: {}", project.name));
    if !project.client.is_empty() {
        io::print_info(format!("  Client    : {}", project.client));
    }
    io::print_info(format!(
        "  Status    : {} (priority {})",
        project.status, project.priority
    ));
    io::print_info(format!("  Started   : {}", project.start_date));
    if let Some(deadline) = project.deadline {
        io::print_info(format!("  Deadline  : {deadline}"));
    }
    io::print_info(format!(
        "  Received  : {} of {} {}",
        money(project.received_amount),
        money(project.budget),
        progress_bar(project.completion_percentage(), 20)
    ));
    io::print_info(format!("  Expenses  : {}", money(project.total_expenses())));
    io::print_info(format!(
        "  Profit    : {} ({:.1}% margin)",
        money(project.profit()),
        project.profit_margin()
    ));
    if !project.notes.is_empty() {
        io::print_info(format!("  Notes     : {}", project.notes));
    }

    if !project.milestones.is_empty() {
        output_section("Milestones");
        let rows: Vec<Vec<String>> = project
            .milestones
            .iter()
            .map(|milestone| {
                vec![
                    if milestone.is_completed { "x" } else { " " }.to_string(),
                    milestone.name.clone(),
                    money(milestone.payment_amount),
                    milestone
                        .due_date
                        .map(|date| date.to_string())
                        .unwrap_or_else(|| "-".into()),
                    format!("{} XP", milestone.xp),
                ]
            })
            .collect();
        table(&["", "Milestone", "Payment", "Due", "Reward"], &rows);
    }
    if !project.expenses.is_empty() {
        output_section("Expenses");
        let rows: Vec<Vec<String>> = project
            .expenses
            .iter()
            .map(|expense| {
                vec![
                    expense.date.to_string(),
                    expense.description.clone(),
                    expense.category.clone(),
                    money(expense.amount),
                ]
            })
            .collect();
        table(&["Date", "Description", "Category", "Amount"], &rows);
    }
    Ok(())
}

fn edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let key = context.require(args.get(0), "project", USAGE)?;
    let id = find(context, &key)?;
    let Some(mut changes) = context.data.projects.iter().find(|p| p.id == id).cloned() else {
        return Ok(());
    };
    if let Some(name) = args.option("name") {
        changes.name = name.to_string();
    }
    if let Some(client) = args.option("client") {
        changes.client = client.to_string();
    }
    if let Some(budget) = args.option("budget") {
        changes.budget = parse_amount(budget)?;
    }
    if let Some(expected) = args.option("expected") {
        changes.expected_income = parse_amount(expected)?;
    }
    if let Some(deadline) = args.option("deadline") {
        changes.deadline = Some(parse_date(deadline, context.today())?);
    }
    ProjectService::edit(&mut context.data, id, changes)?;
    context.persist()?;
    io::print_success("Project updated.");
    Ok(())
}

fn status(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "project", USAGE)?;
    let status: ProjectStatus =
        parse_choice(&context.require(args.get(1).copied(), "status", USAGE)?)?;
    let id = find(context, &key)?;
    let today = context.today();
    ProjectService::set_status(&mut context.data, id, status, today)?;
    context.persist()?;
    io::print_success(format!("Status set to {status}."));
    Ok(())
}

fn priority(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "project", USAGE)?;
    let value: u8 = parse_number(
        &context.require(args.get(1).copied(), "priority (1-5)", USAGE)?,
        "priority",
    )?;
    let id = find(context, &key)?;
    ProjectService::set_priority(&mut context.data, id, value)?;
    context.persist()?;
    io::print_success(format!("Priority set to {value}."));
    Ok(())
}

fn notes(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "project", USAGE)?;
    let text = args.get(1..).map(|words| words.join(" ")).unwrap_or_default();
    let id = find(context, &key)?;
    ProjectService::set_notes(&mut context.data, id, text.trim())?;
    context.persist()?;
    io::print_success("Notes saved.");
    Ok(())
}

fn milestone(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let key = context.require(args.get(0), "project", USAGE)?;
    let name = context.require(args.get(1), "milestone name", USAGE)?;
    let payment = parse_amount(&context.require(args.get(2), "payment amount", USAGE)?)?;
    let due = args
        .option("due")
        .map(|value| parse_date(value, context.today()))
        .transpose()?;
    let id = find(context, &key)?;
    ProjectService::add_milestone(&mut context.data, id, ProjectMilestone::new(name, payment, due))?;
    context.persist()?;
    io::print_success("Milestone added.");
    Ok(())
}

fn complete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "project", USAGE)?;
    let milestone_key = context.require(
        args.get(1..).map(|words| words.join(" ")).as_deref(),
        "milestone",
        USAGE,
    )?;
    let id = find(context, &key)?;
    let milestone_id = {
        let Some(project) = context.data.projects.iter().find(|p| p.id == id) else {
            return Ok(());
        };
        resolve_id(
            &project.milestones,
            &milestone_key,
            |milestone| milestone.id,
            |milestone| milestone.name.as_str(),
            "milestone",
        )?
    };
    let now = context.now();
    let award = ProjectService::complete_milestone(&mut context.data, id, milestone_id, now)?;
    context.persist()?;
    io::print_success("Milestone completed.");
    context.report_award(&award);
    Ok(())
}

fn expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let key = context.require(args.get(0), "project", USAGE)?;
    let amount = parse_amount(&context.require(args.get(1), "amount", USAGE)?)?;
    let description = context.require(args.rest(2).as_deref(), "description", USAGE)?;
    let date = parse_optional_date(args.option("date"), context.today())?;
    let category = args.option("category").unwrap_or_default();
    let id = find(context, &key)?;
    ProjectService::add_expense(
        &mut context.data,
        id,
        ProjectExpense::new(description, amount, category, date),
    )?;
    context.persist()?;
    io::print_success(format!("Expense of {} recorded.", context.money(amount)));
    Ok(())
}

fn pay(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "project", USAGE)?;
    let amount = parse_amount(&context.require(args.get(1).copied(), "amount", USAGE)?)?;
    let description = args.get(2..).map(|words| words.join(" "));
    let id = find(context, &key)?;
    let now = context.now();
    let award =
        ProjectService::receive_payment(&mut context.data, id, amount, description.as_deref(), now)?;
    context.persist()?;
    io::print_success(format!("Payment of {} received.", context.money(amount)));
    context.report_award(&award);
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "project", USAGE)?;
    let id = find(context, &key)?;
    if !context.confirm("Remove this project and its team assignments?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = ProjectService::remove(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("Project `{}` removed.", removed.name));
    Ok(())
}

pub(crate) fn find(context: &ShellContext, key: &str) -> Result<Uuid, CommandError> {
    resolve_id(
        &context.data.projects,
        key,
        |project| project.id,
        |project| project.name.as_str(),
        "project",
    )
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use crate::domain::{ProjectStatus, TransactionKind};
    use tempfile::TempDir;

    #[test]
    fn project_lifecycle_through_the_shell() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "project add Website 5000 --client Acme --start 2024-01-01 --priority 2",
                "project status website in-progress",
                "project milestone Website Design 1500",
                "project complete Website design",
                "project expense Website 200 Hosting plan --category Software --date 2024-02-01",
                "project pay Website 1000 Second invoice",
            ],
        );
        let data = context.data();
        let project = &data.projects[0];
        assert_eq!(project.client, "Acme");
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.received_amount, 2500.0);
        assert_eq!(project.total_expenses(), 200.0);
        assert!(project.milestones[0].is_completed);

        let expense = data
            .transactions
            .iter()
            .find(|txn| txn.kind == TransactionKind::Expense)
            .expect("expense txn");
        assert_eq!(expense.description, "[Website] Hosting plan");
        assert_eq!(expense.category, "Software");
        let income = data
            .transactions
            .iter()
            .find(|txn| txn.kind == TransactionKind::Income)
            .expect("income txn");
        assert_eq!(income.amount, 1000.0);
        assert!(data.level.total_xp > 0);
    }

    #[test]
    fn payment_on_inactive_project_is_rejected() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "project add Website 5000",
                "project status Website on-hold",
                "project pay Website 100",
            ],
        );
        assert_eq!(context.data().projects[0].received_amount, 0.0);
        assert!(context.data().transactions.is_empty());
    }

    #[test]
    fn remove_cascades_team_members() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "project add Website 5000",
                "team add Website Ana 3000 --role Developer",
                "project remove Website",
            ],
        );
        assert!(context.data().projects.is_empty());
        assert!(context.data().team_members.is_empty());
    }
}
