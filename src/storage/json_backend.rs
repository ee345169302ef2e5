use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{
    domain::FinanceData,
    utils::{
        backups::{backup_file_name, backup_path, list_backups, prune_backups},
        paths::{ensure_dir, write_atomic, PathResolver},
    },
};

use super::{Result, StorageBackend};

const DATA_FILE: &str = "data.json";
const BACKUP_PREFIX: &str = "data";
/// Prefix of the copies taken before every save; pruned apart from named backups.
pub const AUTO_BACKUP_PREFIX: &str = "autosave";
pub const BACKUP_PREFIXES: [&str; 2] = [BACKUP_PREFIX, AUTO_BACKUP_PREFIX];
const DEFAULT_RETENTION: usize = 5;

/// Stores the whole document as pretty JSON in `<base>/data/data.json`.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    root: PathBuf,
    data_file: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let app_root = PathResolver::resolve_base(root);
        ensure_dir(&app_root)?;
        let data_dir = PathResolver::data_dir_in(&app_root);
        let backups_dir = PathResolver::backup_dir_in(&app_root);
        ensure_dir(&data_dir)?;
        ensure_dir(&backups_dir)?;
        Ok(Self {
            root: app_root,
            data_file: data_dir.join(DATA_FILE),
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn data_path(&self) -> &Path {
        &self.data_file
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    pub fn set_retention(&mut self, retention: usize) {
        self.retention = retention.max(1);
    }

    /// Like [`StorageBackend::load`], but a corrupt file is logged and replaced by a
    /// fresh seeded document instead of failing.
    pub fn load_or_default(&self) -> FinanceData {
        match self.load() {
            Ok(data) => data,
            Err(err) => {
                warn!(path = %self.data_file.display(), error = %err, "data file unreadable, starting fresh");
                FinanceData::seeded()
            }
        }
    }

    /// Copies the current file into the backup folder before it is overwritten.
    fn backup_existing_file(&self) -> Result<()> {
        if !self.data_file.exists() {
            return Ok(());
        }
        let name = backup_file_name(AUTO_BACKUP_PREFIX, None, Utc::now());
        fs::copy(&self.data_file, self.backups_dir.join(&name))?;
        debug!(backup = %name, "previous data file preserved");
        self.prune(AUTO_BACKUP_PREFIX)
    }

    fn prune(&self, prefix: &str) -> Result<()> {
        let removed = prune_backups(&self.backups_dir, prefix, self.retention)?;
        if !removed.is_empty() {
            debug!(prefix, count = removed.len(), "pruned old backups");
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn load(&self) -> Result<FinanceData> {
        if !self.data_file.exists() {
            info!("no data file yet, using defaults");
            return Ok(FinanceData::seeded());
        }
        let json = fs::read_to_string(&self.data_file)?;
        let data: FinanceData = serde_json::from_str(&json)?;
        debug!(
            transactions = data.transactions.len(),
            projects = data.projects.len(),
            "data loaded"
        );
        Ok(data)
    }

    fn save(&self, data: &FinanceData) -> Result<()> {
        self.backup_existing_file()?;
        let json = serde_json::to_string_pretty(data)?;
        write_atomic(&self.data_file, &json)?;
        info!(path = %self.data_file.display(), "data saved");
        Ok(())
    }

    fn backup(&self, data: &FinanceData, note: Option<&str>) -> Result<String> {
        ensure_dir(&self.backups_dir)?;
        let name = backup_file_name(BACKUP_PREFIX, note, Utc::now());
        let json = serde_json::to_string_pretty(data)?;
        write_atomic(&self.backups_dir.join(&name), &json)?;
        self.prune(BACKUP_PREFIX)?;
        info!(backup = %name, "backup created");
        Ok(name)
    }

    fn list_backups(&self) -> Result<Vec<String>> {
        list_backups(&self.backups_dir, &BACKUP_PREFIXES)
    }

    fn restore(&self, backup_name: &str) -> Result<FinanceData> {
        let path = backup_path(&self.backups_dir, backup_name)?;
        let json = fs::read_to_string(&path)?;
        let data: FinanceData = serde_json::from_str(&json)?;
        self.save(&data)?;
        info!(backup = %backup_name, "backup restored");
        Ok(data)
    }
}

/// Dangling references found in a loaded document. They never block loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataWarnings {
    pub messages: Vec<String>,
}

impl DataWarnings {
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

pub fn check_integrity(data: &FinanceData) -> DataWarnings {
    let mut messages = Vec::new();
    for member in &data.team_members {
        if data.project(member.project_id).is_none() {
            messages.push(format!(
                "Team member `{}` references a missing project",
                member.name
            ));
        }
    }
    for receivable in &data.receivables {
        if let Some(project_id) = receivable.project_id {
            if data.project(project_id).is_none() {
                messages.push(format!(
                    "Receivable `{}` references a missing project",
                    receivable.title
                ));
            }
        }
    }
    let mut unknown: Vec<&str> = data
        .transactions
        .iter()
        .map(|txn| txn.category.as_str())
        .filter(|category| !category.trim().is_empty() && data.category(category).is_none())
        .collect();
    unknown.sort_unstable();
    unknown.dedup();
    for category in unknown {
        messages.push(format!("Transactions use unknown category `{category}`"));
    }
    DataWarnings { messages }
}
