use std::fmt;

use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::cli::core::CommandError;
use crate::cli::output;

pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

pub fn print_error(message: impl fmt::Display) {
    output::error(message);
}

pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

pub fn print_hint(message: impl fmt::Display) {
    output::hint(message);
}

/// Yes/no question on the terminal.
pub fn confirm_action(theme: &ColorfulTheme, prompt: &str, default: bool) -> Result<bool, CommandError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}

/// Free-form text; an empty answer is allowed when `allow_empty` is set.
pub fn prompt_text(
    theme: &ColorfulTheme,
    prompt: &str,
    allow_empty: bool,
) -> Result<String, CommandError> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(allow_empty)
        .interact_text()
        .map_err(CommandError::from)
}
