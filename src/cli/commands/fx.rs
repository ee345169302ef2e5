use crate::cli::commands::unknown_subcommand;
use crate::cli::core::{parse_amount, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{section as output_section, table};
use crate::cli::registry::CommandEntry;
use crate::currency::{self, format_money, RateSource};

const USAGE: &str = "fx <list|convert|clear> ...\n  \
    fx list\n  \
    fx convert <amount> <from> <to>\n  \
    fx clear";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "fx",
        "Supported currencies and conversions",
        USAGE,
        cmd_fx,
    )]
}

fn cmd_fx(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((sub, rest)) = args.split_first() else {
        return list(context);
    };
    match sub.to_ascii_lowercase().as_str() {
        "list" | "ls" => list(context),
        "convert" => convert(context, rest),
        "clear" => {
            context.currency.clear_cache();
            io::print_success("Rate cache cleared.");
            Ok(())
        }
        other => Err(unknown_subcommand("fx", other, USAGE)),
    }
}

fn list(context: &mut ShellContext) -> CommandResult {
    let base = context.base_currency();
    let now = context.now();
    output_section(format!("Currencies (rates to {base})"));
    let rows: Vec<Vec<String>> = currency::supported()
        .iter()
        .map(|entry| {
            let quote = context.currency.quote(entry.code, &base, now);
            vec![
                entry.code.to_string(),
                entry.symbol.to_string(),
                entry.name.to_string(),
                format!("{:.4}", quote.rate),
                source_label(quote.source).to_string(),
            ]
        })
        .collect();
    table(&["Code", "Symbol", "Name", "Rate", "Source"], &rows);
    Ok(())
}

fn convert(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let amount = parse_amount(&context.require(args.first().copied(), "amount", USAGE)?)?;
    let from = supported_code(&context.require(args.get(1).copied(), "source currency", USAGE)?)?;
    let to = supported_code(&context.require(args.get(2).copied(), "target currency", USAGE)?)?;
    let now = context.now();
    let quote = context.currency.quote(&from, &to, now);
    io::print_info(format!(
        "{} = {} (rate {:.4}, {})",
        format_money(amount, &from),
        format_money(amount * quote.rate, &to),
        quote.rate,
        source_label(quote.source)
    ));
    Ok(())
}

fn supported_code(input: &str) -> Result<String, CommandError> {
    let code = input.trim().to_ascii_uppercase();
    if currency::is_supported(&code) {
        Ok(code)
    } else {
        Err(CommandError::InvalidArguments(format!(
            "unsupported currency `{code}`"
        )))
    }
}

fn source_label(source: RateSource) -> &'static str {
    match source {
        RateSource::Identity => "same currency",
        RateSource::Cache => "cached",
        RateSource::Provider => "live",
        RateSource::Fallback => "offline table",
    }
}

#[cfg(test)]
mod tests {
    use super::supported_code;

    #[test]
    fn codes_are_normalized_and_checked() {
        assert_eq!(supported_code(" usd ").unwrap(), "USD");
        assert!(supported_code("XYZ").is_err());
    }
}
