use std::{
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::info;

use super::ServiceResult;
use crate::domain::Transaction;
use crate::errors::FinanceError;
use crate::utils::paths::ensure_dir;

pub const CSV_HEADER: [&str; 7] = [
    "Date",
    "Description",
    "Amount",
    "Type",
    "Category",
    "Currency",
    "Notes",
];

pub struct ExportService;

impl ExportService {
    pub fn file_name(at: DateTime<Utc>) -> String {
        format!("NexusFinance_Export_{}.csv", at.format("%Y%m%d_%H%M%S"))
    }

    /// Writes transactions as CSV with a header row. Returns the number of rows written.
    pub fn write_csv<W: Write>(transactions: &[Transaction], writer: W) -> ServiceResult<usize> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(CSV_HEADER).map_err(FinanceError::from)?;
        for txn in transactions {
            csv.write_record([
                txn.date.format("%Y-%m-%d").to_string(),
                txn.description.clone(),
                format!("{:.2}", txn.amount),
                txn.kind.to_string(),
                txn.category.clone(),
                txn.currency.clone(),
                txn.notes.clone(),
            ])
            .map_err(FinanceError::from)?;
        }
        csv.flush().map_err(FinanceError::from)?;
        Ok(transactions.len())
    }

    /// Exports into `dir` under a timestamped name and returns the created path.
    pub fn export_to_dir(
        transactions: &[Transaction],
        dir: &Path,
        at: DateTime<Utc>,
    ) -> ServiceResult<PathBuf> {
        ensure_dir(dir)?;
        let path = dir.join(Self::file_name(at));
        let file = std::fs::File::create(&path).map_err(FinanceError::from)?;
        let rows = Self::write_csv(transactions, file)?;
        info!(path = %path.display(), rows, "transactions exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    #[test]
    fn csv_quotes_fields_that_need_it() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let mut txn = Transaction::expense("Dinner, drinks", 42.5, "Food", date);
        txn.notes = "said \"thanks\"".into();
        let mut buffer = Vec::new();
        let rows = ExportService::write_csv(&[txn], &mut buffer).expect("write");
        assert_eq!(rows, 1);
        let text = String::from_utf8(buffer).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,Description,Amount,Type,Category,Currency,Notes"));
        assert_eq!(
            lines.next(),
            Some("2024-05-06,\"Dinner, drinks\",42.50,Expense,Food,RUB,\"said \"\"thanks\"\"\"")
        );
    }

    #[test]
    fn export_creates_timestamped_file() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let path = ExportService::export_to_dir(&[], &temp.path().join("exports"), at)
            .expect("export");
        assert!(path.ends_with("NexusFinance_Export_20240102_030405.csv"));
        assert!(path.exists());
    }
}
