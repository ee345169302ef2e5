pub mod json_backend;

use crate::{domain::FinanceData, errors::FinanceError};

pub type Result<T> = std::result::Result<T, FinanceError>;

/// Abstraction over persistence backends holding the finance document and its snapshots.
pub trait StorageBackend: Send + Sync {
    fn load(&self) -> Result<FinanceData>;
    fn save(&self, data: &FinanceData) -> Result<()>;
    /// Writes a named snapshot of `data`; returns the backup file name.
    fn backup(&self, data: &FinanceData, note: Option<&str>) -> Result<String>;
    /// Backup names, newest first.
    fn list_backups(&self) -> Result<Vec<String>>;
    fn restore(&self, backup_name: &str) -> Result<FinanceData>;
}

pub use json_backend::{check_integrity, DataWarnings, JsonStorage};
