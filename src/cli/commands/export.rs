use std::path::PathBuf;

use crate::cli::core::{CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::CommandEntry;
use crate::core::services::ExportService;
use crate::utils::paths::PathResolver;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "export",
        "Write all transactions to a CSV file",
        "export [directory]",
        cmd_export,
    )]
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if context.data.transactions.is_empty() {
        io::print_info("No transactions to export.");
        return Ok(());
    }
    let dir = match args.first() {
        Some(dir) => PathBuf::from(dir),
        None => PathResolver::export_dir_in(context.storage.base_dir()),
    };
    let path = ExportService::export_to_dir(&context.data.transactions, &dir, context.now())?;
    io::print_success(format!(
        "Exported {} transaction(s) to {}.",
        context.data.transactions.len(),
        path.display()
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::core::process_script;
    use tempfile::TempDir;

    #[test]
    fn export_writes_csv_into_given_directory() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out");
        let command = format!("export {}", target.display());
        process_script(
            temp.path(),
            &["txn add expense 12.5 Food \"Coffee, large\" --date 2024-03-01", &command],
        );
        let files: Vec<_> = std::fs::read_dir(&target)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);
        let csv = std::fs::read_to_string(&files[0]).unwrap();
        assert!(csv.starts_with("Date,Description,Amount,Type,Category,Currency,Notes"));
        assert!(csv.contains("2024-03-01,\"Coffee, large\",12.50,"));
    }
}
