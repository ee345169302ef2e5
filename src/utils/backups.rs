//! Naming, listing, and pruning of timestamped backup files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use super::paths::sanitize_note;
use crate::errors::FinanceError;

pub const BACKUP_EXTENSION: &str = "json";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;

/// `<prefix>_YYYYMMDD_HHMMSS[_note].json`
pub fn backup_file_name(prefix: &str, note: Option<&str>, at: DateTime<Utc>) -> String {
    let mut name = format!("{prefix}_{}", at.format(TIMESTAMP_FORMAT));
    if let Some(label) = sanitize_note(note) {
        name.push('_');
        name.push_str(&label);
    }
    name.push('.');
    name.push_str(BACKUP_EXTENSION);
    name
}

pub fn parse_backup_timestamp(prefix: &str, name: &str) -> Option<DateTime<Utc>> {
    let rest = name.strip_prefix(prefix)?.strip_prefix('_')?;
    let stamp = rest.get(..TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Timestamp of a backup written under any of `prefixes`.
pub fn backup_timestamp(prefixes: &[&str], name: &str) -> Option<DateTime<Utc>> {
    prefixes
        .iter()
        .find_map(|prefix| parse_backup_timestamp(prefix, name))
}

/// Backup file names in `dir` that carry one of `prefixes`, newest first.
pub fn list_backups(dir: &Path, prefixes: &[&str]) -> Result<Vec<String>, FinanceError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries: Vec<(Option<DateTime<Utc>>, String)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            if let Some(stamp) = backup_timestamp(prefixes, name) {
                entries.push((Some(stamp), name.to_string()));
            }
        }
    }
    entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)));
    Ok(entries.into_iter().map(|(_, name)| name).collect())
}

/// Deletes the oldest backups beyond `keep`. Returns the removed names.
pub fn prune_backups(dir: &Path, prefix: &str, keep: usize) -> Result<Vec<String>, FinanceError> {
    let names = list_backups(dir, &[prefix])?;
    let mut removed = Vec::new();
    for name in names.into_iter().skip(keep) {
        fs::remove_file(dir.join(&name))?;
        removed.push(name);
    }
    Ok(removed)
}

/// Path of backup `name` inside `dir`. Only bare file names are accepted.
pub fn backup_path(dir: &Path, name: &str) -> Result<PathBuf, FinanceError> {
    let bare = Path::new(name).file_name().and_then(|file| file.to_str()) == Some(name);
    if !bare {
        return Err(FinanceError::Validation(format!(
            "`{name}` is not a backup file name"
        )));
    }
    let path = dir.join(name);
    if !path.is_file() {
        return Err(FinanceError::NotFound(format!("backup `{name}`")));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_embeds_timestamp_and_note() {
        let at = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        let name = backup_file_name("data", Some("Year End"), at);
        assert_eq!(name, "data_20240203_040506_year-end.json");
        assert_eq!(parse_backup_timestamp("data", &name), Some(at));
        assert_eq!(parse_backup_timestamp("config", &name), None);
    }

    #[test]
    fn listing_is_newest_first_and_pruning_drops_the_tail() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        for (hour, note) in [(1, "a"), (3, "c"), (2, "b")] {
            let at = Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap();
            let name = backup_file_name("data", Some(note), at);
            fs::write(temp.path().join(name), "{}").expect("write");
        }
        fs::write(temp.path().join("notes.txt"), "ignored").expect("write");

        let listed = list_backups(temp.path(), &["data"]).expect("list");
        assert_eq!(listed[0], "data_20240101_030000_c.json");
        assert_eq!(listed.len(), 3);

        let removed = prune_backups(temp.path(), "data", 2).expect("prune");
        assert_eq!(removed, vec!["data_20240101_010000_a.json".to_string()]);
        assert_eq!(list_backups(temp.path(), &["data"]).expect("list").len(), 2);
    }

    #[test]
    fn pruning_one_prefix_leaves_the_other_alone() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let kept = backup_file_name("data", Some("before tax"), early);
        fs::write(temp.path().join(&kept), "{}").expect("write");
        for minute in 1..=4 {
            let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, minute, 0).unwrap();
            fs::write(temp.path().join(backup_file_name("autosave", None, at)), "{}")
                .expect("write");
        }

        let removed = prune_backups(temp.path(), "autosave", 2).expect("prune");
        assert_eq!(removed.len(), 2);
        let listed = list_backups(temp.path(), &["data", "autosave"]).expect("list");
        assert_eq!(listed.len(), 3);
        assert_eq!(listed.last(), Some(&kept));
        assert_eq!(backup_timestamp(&["data", "autosave"], &kept), Some(early));
    }

    #[test]
    fn backup_paths_must_be_bare_names() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let backups = temp.path().join("backups");
        fs::create_dir(&backups).expect("dir");
        fs::write(temp.path().join("evil.json"), "{}").expect("write");
        fs::write(backups.join("data_20240101_000000.json"), "{}").expect("write");

        assert!(backup_path(&backups, "data_20240101_000000.json").is_ok());
        for name in ["../evil.json", "", "..", "sub/data.json"] {
            let err = backup_path(&backups, name).unwrap_err();
            assert!(matches!(err, FinanceError::Validation(_)), "{name}");
        }
        let absolute = temp.path().join("evil.json");
        assert!(backup_path(&backups, &absolute.to_string_lossy()).is_err());
        assert!(matches!(
            backup_path(&backups, "missing.json"),
            Err(FinanceError::NotFound(_))
        ));
    }
}
