// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::storage::Storage;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_open_creates_base_path() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("nested").join("storage");
    let storage = Storage::new(&base).unwrap();
    assert!(base.is_dir());
    assert_eq!(storage.base_path(), base.as_path());
}

#[test]
fn test_find_collection_is_case_insensitive_and_cached() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(dir.path()).unwrap();

    let a = storage.find_collection("Reminders").unwrap();
    let b = storage.find_collection("REMINDERS").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.name(), "reminders");
    assert_eq!(a.path(), dir.path().join("reminders.json").as_path());
    assert_eq!(storage.collection_names(), vec!["reminders"]);
}

#[test]
fn test_new_collection_is_not_written_until_mutated() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(dir.path()).unwrap();

    let c = storage.find_collection("quiet").unwrap();
    assert!(!c.is_dirty());
    let report = storage.synchronize();
    assert!(report.persisted.is_empty());
    assert!(!dir.path().join("quiet.json").exists());
}

#[test]
fn test_find_existing_missing_creates_nothing() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(dir.path()).unwrap();

    assert!(storage.find_existing("ghost").unwrap().is_none());
    assert!(storage.find_collection_with("ghost", false).unwrap().is_none());
    assert!(storage.collection_names().is_empty());
    assert!(!dir.path().join("ghost.json").exists());
}

#[test]
fn test_find_existing_loads_from_disk() {
    let dir = tempdir().unwrap();
    {
        let storage = Storage::new(dir.path()).unwrap();
        storage.find_collection("prefs").unwrap().set("discord:1", "lang=pt");
        assert!(storage.synchronize().is_clean());
    }

    let storage = Storage::new(dir.path()).unwrap();
    let prefs = storage.find_existing("Prefs").unwrap().expect("prefs should load");
    assert_eq!(prefs.get("discord:1").as_deref(), Some("lang=pt"));
    assert!(!prefs.is_dirty());
}

#[test]
fn test_synchronize_only_writes_dirty_collections() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(dir.path()).unwrap();

    storage.find_collection("a").unwrap().append("t", "1");
    storage.find_collection("b").unwrap().append("t", "1");
    let report = storage.synchronize();
    let mut persisted = report.persisted.clone();
    persisted.sort();
    assert_eq!(persisted, vec!["a", "b"]);

    let a = storage.find_collection("a").unwrap();
    let b = storage.find_collection("b").unwrap();
    assert!(!a.is_dirty());
    assert!(!b.is_dirty());

    let b_modified = fs::metadata(b.path()).unwrap().modified().unwrap();
    a.append("t", "2");
    let report = storage.synchronize();
    assert_eq!(report.persisted, vec!["a"]);
    assert_eq!(fs::metadata(b.path()).unwrap().modified().unwrap(), b_modified);
}

#[test]
fn test_synchronize_retries_failed_collections() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(dir.path()).unwrap();

    let ok = storage.find_collection("ok").unwrap();
    let blocked = storage.find_collection("blocked").unwrap();
    ok.append("t", "1");
    blocked.append("t", "1");

    // A directory squatting on the document path makes the rename fail.
    fs::create_dir(blocked.path()).unwrap();

    let report = storage.synchronize();
    assert_eq!(report.persisted, vec!["ok"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "blocked");
    assert!(matches!(report.failed[0].1, StoreError::Persist { .. }));
    assert!(blocked.is_dirty());
    assert!(!ok.is_dirty());

    fs::remove_dir(blocked.path()).unwrap();
    let report = storage.synchronize();
    assert_eq!(report.persisted, vec!["blocked"]);
    assert!(report.is_clean());
}

#[test]
fn test_corrupt_document_aborts_acquisition() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("corrupt.json"), "not json at all").unwrap();
    let storage = Storage::new(dir.path()).unwrap();

    assert!(matches!(storage.find_collection("corrupt"), Err(StoreError::Parse { .. })));
    assert!(matches!(storage.find_existing("corrupt"), Err(StoreError::Parse { .. })));
    assert!(storage.collection_names().is_empty());
    assert_eq!(fs::read_to_string(dir.path().join("corrupt.json")).unwrap(), "not json at all");

    // Once repaired, the next acquisition succeeds.
    fs::write(dir.path().join("corrupt.json"), r#"{"entries":[]}"#).unwrap();
    assert!(storage.find_collection("corrupt").unwrap().is_empty());
}

#[test]
fn test_invalid_names_are_rejected() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(dir.path()).unwrap();
    assert!(matches!(storage.find_collection("../escape"), Err(StoreError::InvalidName(_))));
    assert!(matches!(storage.find_existing(""), Err(StoreError::InvalidName(_))));
}

#[test]
fn test_config_extension_and_backup() {
    let dir = tempdir().unwrap();
    let config = StoreConfig::new(dir.path())
        .with_extension("store")
        .with_sync_writes(false)
        .with_backup(true)
        .with_sync_interval(None);
    let storage = Storage::open(config).unwrap();

    let c = storage.find_collection("notes").unwrap();
    assert_eq!(c.path(), dir.path().join("notes.store").as_path());

    c.append("t", "1");
    storage.synchronize();
    c.append("t", "2");
    storage.synchronize();

    let prev = fs::read_to_string(dir.path().join("notes.store.prev")).unwrap();
    assert!(prev.contains("\"1\""));
    assert!(!prev.contains("\"2\""));
}
