//! Balance store file tests
//!
//! Verifies:
//! - Saved balance loads back unchanged
//! - Missing, corrupt and incomplete files fall back to the default
//! - Parent directories are created on save

use sf_state::{BalanceStore, JsonBalanceStore, StateError, load_balance_or, save_balance};
use tempfile::TempDir;

fn store_in(dir: &TempDir, name: &str) -> JsonBalanceStore {
    JsonBalanceStore::new(dir.path().join(name))
}

#[test]
fn test_saved_balance_loads_back() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "balance.json");

    store.save(1234).unwrap();
    assert_eq!(store.load().unwrap(), 1234);

    store.save(0).unwrap();
    assert_eq!(load_balance_or(&store, 1000), 0);
}

#[test]
fn test_file_format() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "balance.json");
    store.save(77).unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["balance"], 77);
}

#[test]
fn test_missing_file_uses_default() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "never-written.json");

    assert!(matches!(store.load(), Err(StateError::Io(_))));
    assert_eq!(load_balance_or(&store, 1000), 1000);
}

#[test]
fn test_corrupt_file_uses_default() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "balance.json");

    std::fs::write(store.path(), "{ not json").unwrap();
    assert!(matches!(store.load(), Err(StateError::Serialization(_))));
    assert_eq!(load_balance_or(&store, 1000), 1000);

    std::fs::write(store.path(), r#"{"balance": -5}"#).unwrap();
    assert_eq!(load_balance_or(&store, 1000), 1000);
}

#[test]
fn test_missing_field_uses_default() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "balance.json");

    std::fs::write(store.path(), r#"{"credits": 5}"#).unwrap();
    assert!(matches!(store.load(), Err(StateError::MissingBalance)));
    assert_eq!(load_balance_or(&store, 1000), 1000);
}

#[test]
fn test_save_creates_parent_dirs() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir, "nested/deeper/balance.json");

    assert!(save_balance(&store, 500));
    assert_eq!(store.load().unwrap(), 500);
}
