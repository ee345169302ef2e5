//! Resolution of the on-disk locations used by storage and configuration.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::errors::FinanceError;

pub const HOME_ENV: &str = "NEXUS_FINANCE_HOME";

const DEFAULT_DIR_NAME: &str = ".nexus_finance";
const DATA_DIR: &str = "data";
const BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";
const CONFIG_BACKUP_DIR: &str = "config_backups";
const EXPORT_DIR: &str = "exports";

/// Maps a base directory onto the files and folders the application owns.
pub struct PathResolver;

impl PathResolver {
    /// Application directory: `NEXUS_FINANCE_HOME`, else `~/.nexus_finance`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn data_dir_in(base: &Path) -> PathBuf {
        base.join(DATA_DIR)
    }

    pub fn backup_dir_in(base: &Path) -> PathBuf {
        base.join(BACKUP_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }

    pub fn config_backup_dir_in(base: &Path) -> PathBuf {
        base.join(CONFIG_BACKUP_DIR)
    }

    pub fn export_dir_in(base: &Path) -> PathBuf {
        base.join(EXPORT_DIR)
    }
}

pub fn ensure_dir(path: &Path) -> Result<(), FinanceError> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Lowercases a free-form note into a dash-separated file-name fragment.
pub fn sanitize_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    if raw.is_empty() {
        return None;
    }
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || matches!(ch, '-' | '.' | '_'))
            && !sanitized.is_empty()
            && !last_dash
        {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-').to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Sibling path used for atomic writes (`data.json` -> `data.json.tmp`).
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.tmp"),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` to a temporary sibling and renames it over `path`.
pub fn write_atomic(path: &Path, data: &str) -> Result<(), FinanceError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_note_collapses_separators() {
        assert_eq!(
            sanitize_note(Some("  Before  Tax. Season ")),
            Some("before-tax-season".to_string())
        );
        assert_eq!(sanitize_note(Some("!!!")), None);
        assert_eq!(sanitize_note(None), None);
    }

    #[test]
    fn tmp_path_appends_suffix() {
        let path = Path::new("/tmp/data.json");
        assert_eq!(tmp_path(path), PathBuf::from("/tmp/data.json.tmp"));
    }

    #[test]
    fn write_atomic_creates_parent_directories() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let target = temp.path().join("nested").join("file.json");
        write_atomic(&target, "{}").expect("write");
        assert_eq!(fs::read_to_string(&target).expect("read"), "{}");
        assert!(!tmp_path(&target).exists());
    }
}
