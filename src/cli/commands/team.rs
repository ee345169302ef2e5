use uuid::Uuid;

use crate::cli::commands::{project, unknown_subcommand};
use crate::cli::core::{
    parse_amount, parse_choice, parse_optional_date, resolve_id, short_id, Args, CommandError,
    CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::core::services::TeamService;
use crate::domain::{PaymentFrequency, TeamMember};

const USAGE: &str = "team <add|list|toggle|remove|payroll> ...\n  \
    team add <project> <name> <salary> [--role R] [--frequency monthly|hourly|one-time] [--joined D]\n  \
    team list [project]\n  \
    team toggle <member>\n  \
    team remove <member>\n  \
    team payroll [project]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "team",
        "Assign people to projects and track payroll",
        USAGE,
        cmd_team,
    )]
}

fn cmd_team(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context, &[]);
    };
    match sub.to_ascii_lowercase().as_str() {
        "add" => add(context, rest),
        "list" | "ls" => list(context, rest),
        "toggle" => toggle(context, rest),
        "remove" | "rm" => remove(context, rest),
        "payroll" => payroll(context, rest),
        other => Err(unknown_subcommand("team", other, USAGE)),
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let args = Args::parse(args)?;
    let project_key = context.require(args.get(0), "project", USAGE)?;
    let name = context.require(args.get(1), "member name", USAGE)?;
    let salary = parse_amount(&context.require(args.get(2), "salary", USAGE)?)?;
    let frequency = args
        .option("frequency")
        .map(parse_choice::<PaymentFrequency>)
        .transpose()?
        .unwrap_or_default();
    let joined = parse_optional_date(args.option("joined"), context.today())?;
    let project_id = project::find(context, &project_key)?;

    let member = TeamMember::new(
        name.trim(),
        args.option("role").unwrap_or_default(),
        salary,
        frequency,
        project_id,
        joined,
    );
    let label = member.name.clone();
    TeamService::add(&mut context.data, member)?;
    context.persist()?;
    io::print_success(format!("`{label}` joined the team."));
    Ok(())
}

fn list(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let project_filter = project_filter(context, args)?;
    output_section("Team");
    let members: Vec<&TeamMember> = match project_filter {
        Some(id) => TeamService::members_for_project(&context.data, id),
        None => context.data.team_members.iter().collect(),
    };
    if members.is_empty() {
        io::print_info("No team members. Use `team add`.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = members
        .iter()
        .map(|member| {
            vec![
                short_id(member.id),
                member.name.clone(),
                member.role.clone(),
                context
                    .data
                    .project(member.project_id)
                    .map(|project| project.name.clone())
                    .unwrap_or_default(),
                format!("{} {}", context.money(member.salary), member.frequency),
                if member.is_active { "Active" } else { "Inactive" }.to_string(),
            ]
        })
        .collect();
    table(&["Id", "Name", "Role", "Project", "Pay", "State"], &rows);
    Ok(())
}

fn toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "member", USAGE)?;
    let id = find(context, &key)?;
    let active = TeamService::toggle_active(&mut context.data, id)?;
    context.persist()?;
    io::print_success(if active {
        "Member reactivated."
    } else {
        "Member deactivated."
    });
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let key = context.require(args.first().copied(), "member", USAGE)?;
    let id = find(context, &key)?;
    if !context.confirm("Remove this team member?", false)? {
        io::print_info("Operation cancelled.");
        return Ok(());
    }
    let removed = TeamService::remove(&mut context.data, id)?;
    context.persist()?;
    io::print_success(format!("`{}` removed from the team.", removed.name));
    Ok(())
}

fn payroll(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let project_filter = project_filter(context, args)?;
    let total = TeamService::payroll(&context.data, project_filter);
    let active = context
        .data
        .team_members
        .iter()
        .filter(|member| member.is_active)
        .filter(|member| project_filter.map_or(true, |id| member.project_id == id))
        .count();
    io::print_info(format!(
        "Monthly payroll: {} across {active} active member(s).",
        context.money(total)
    ));
    Ok(())
}

fn project_filter(context: &ShellContext, args: &[&str]) -> Result<Option<Uuid>, CommandError> {
    if args.is_empty() {
        return Ok(None);
    }
    project::find(context, &args.join(" ")).map(Some)
}

fn find(context: &ShellContext, key: &str) -> Result<Uuid, CommandError> {
    resolve_id(
        &context.data.team_members,
        key,
        |member| member.id,
        |member| member.name.as_str(),
        "team member",
    )
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use crate::core::services::TeamService;
    use tempfile::TempDir;

    #[test]
    fn payroll_counts_active_members_only() {
        let temp = TempDir::new().unwrap();
        let context = process_script(
            temp.path(),
            &[
                "project add Website 5000",
                "project add App 9000",
                "team add Website Ana 3000 --role Developer",
                "team add Website Bo 20 --frequency hourly",
                "team add App Cy 1000",
                "team toggle cy",
                "team add Missing Dee 100",
            ],
        );
        let data = context.data();
        assert_eq!(data.team_members.len(), 3);
        assert_eq!(TeamService::payroll(data, None), 6200.0);
        assert_eq!(TeamService::payroll(data, Some(data.projects[1].id)), 0.0);
    }
}
