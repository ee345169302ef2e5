use crate::advisor::{AskOutcome, FinancialContext, Sender, ADVISOR_NAME, SAMPLE_QUESTIONS};
use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;

const USAGE: &str = "cfo <ask|context|history|clear> ...\n  \
    cfo ask <question>\n  \
    cfo context\n  \
    cfo history\n  \
    cfo clear";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "cfo",
        "Ask the financial advisor about your numbers",
        USAGE,
        cmd_cfo,
    )]
}

fn cmd_cfo(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return history(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "ask" => ask(context, rest),
        "context" => show_context(context),
        "history" => history(context),
        "clear" => {
            context.advisor.clear();
            io::print_success("Conversation cleared.");
            Ok(())
        }
        other => Err(unknown_subcommand("cfo", other, USAGE)),
    }
}

fn ask(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let question = context.require(
        (!args.is_empty()).then(|| args.join(" ")).as_deref(),
        "question",
        USAGE,
    )?;
    let snapshot = FinancialContext::from_data(&context.data, context.today());
    match context.advisor.ask(&question, &snapshot) {
        AskOutcome::Ignored => {}
        AskOutcome::NotConfigured => {
            io::print_warning(format!("{ADVISOR_NAME} is not configured."));
            io::print_hint("`cfo context` shows the figures an advisor would receive.");
        }
        AskOutcome::Answered(answer) => {
            output_section(ADVISOR_NAME);
            io::print_info(answer);
        }
        AskOutcome::Failed(message) => io::print_error(message),
    }
    Ok(())
}

fn show_context(context: &mut ShellContext) -> CommandResult {
    let snapshot = FinancialContext::from_data(&context.data, context.today());
    output_section("Advisor context");
    io::print_info(snapshot.render_prompt());
    Ok(())
}

fn history(context: &mut ShellContext) -> CommandResult {
    output_section(ADVISOR_NAME);
    for message in context.advisor.history() {
        let line = format!("{}: {}", message.sender.label(), message.text);
        match message.sender {
            Sender::Error => io::print_error(line),
            Sender::System => io::print_warning(line),
            Sender::User | Sender::Advisor => io::print_info(line),
        }
    }
    if !context.advisor.is_configured() {
        io::print_hint(format!("Try asking: {}", SAMPLE_QUESTIONS[0]));
    }
    Ok(())
}
