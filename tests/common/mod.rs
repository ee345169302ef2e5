#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use nexus_finance::{config::ConfigManager, storage::JsonStorage};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated storage and configuration backed by a unique directory.
pub fn setup_test_env() -> (JsonStorage, ConfigManager) {
    let base = temp_home();
    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage");
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    (storage, config_manager)
}
