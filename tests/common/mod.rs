#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use meter_ledger::{
    config::ConfigManager, core::session::PeriodSession, domain::Entry, storage::CsvStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh application home that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Session and config manager backed by an isolated home directory.
pub fn setup_test_env() -> (PeriodSession, ConfigManager, PathBuf) {
    let base = temp_home();
    let store = CsvStore::open(base.join("periods")).expect("create csv store");
    let session = PeriodSession::new(Box::new(store));
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");
    (session, config_manager, base)
}

pub fn north() -> Entry {
    Entry::new("North")
        .with_readings(100.0, 150.0)
        .with_rate(2.0)
        .with_payment(80.0)
}
