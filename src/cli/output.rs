use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "",
        MessageKind::Success => "[ok] ",
        MessageKind::Warning => "[!] ",
        MessageKind::Error => "[x] ",
        MessageKind::Hint => "hint: ",
        MessageKind::Section => "",
    }
}

pub(crate) fn style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let plain = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => format!("{}{}", label(kind), text),
    };
    match kind {
        MessageKind::Info => plain,
        MessageKind::Success => plain.bright_green().to_string(),
        MessageKind::Warning => plain.bright_yellow().to_string(),
        MessageKind::Error => plain.bright_red().to_string(),
        MessageKind::Hint => plain.dimmed().to_string(),
        MessageKind::Section => plain.bold().to_string(),
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Renders rows as left-aligned columns sized to the widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(index) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.to_vec()));
    out.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

pub fn table(headers: &[&str], rows: &[Vec<String>]) {
    println!("{}", render_table(headers, rows));
}

/// Text progress bar, `[#####-----]` for 50%.
pub fn progress_bar(percent: f64, width: usize) -> String {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns() {
        let rows = vec![
            vec!["Food".to_string(), "12.00".to_string()],
            vec!["Infrastructure".to_string(), "3.50".to_string()],
        ];
        let rendered = render_table(&["Category", "Total"], &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Category        Total");
        assert_eq!(lines[1], "--------------  -----");
        assert_eq!(lines[2], "Food            12.00");
        assert_eq!(lines[3], "Infrastructure  3.50");
    }

    #[test]
    fn progress_bar_clamps() {
        assert_eq!(progress_bar(50.0, 10), "[#####-----]");
        assert_eq!(progress_bar(250.0, 4), "[####]");
        assert_eq!(progress_bar(-5.0, 4), "[----]");
    }

    #[test]
    fn section_wraps_title() {
        colored::control::set_override(false);
        assert_eq!(style(MessageKind::Section, " Summary "), "=== Summary ===");
        assert_eq!(style(MessageKind::Warning, "careful"), "[!] careful");
    }
}
