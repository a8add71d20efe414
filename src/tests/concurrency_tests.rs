// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use crate::storage::Storage;
use tempfile::tempdir;

const THREADS: usize = 16;

#[test]
fn test_concurrent_appends_lose_nothing() {
    let dir = tempdir().unwrap();
    let storage = Storage::new(dir.path()).unwrap();
    let collection = storage.find_collection("queue").unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let collection = Arc::clone(&collection);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                collection.append("channel:1", format!("value-{}", i));
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let list = collection.list("channel:1");
    assert_eq!(list.len(), THREADS);
    let unique: HashSet<_> = list.iter().cloned().collect();
    let expected: HashSet<_> = (0..THREADS).map(|i| format!("value-{}", i)).collect();
    assert_eq!(unique, expected);
}

#[test]
fn test_concurrent_first_lookup_yields_one_instance() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(Storage::new(dir.path()).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let storage = Arc::clone(&storage);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let name = if i % 2 == 0 { "Shared" } else { "shared" };
                let c = storage.find_collection(name).unwrap();
                c.append("t", i.to_string());
                c
            })
        })
        .collect();
    let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for c in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], c));
    }
    assert_eq!(instances[0].count("t"), THREADS);
    assert_eq!(storage.collection_names(), vec!["shared"]);
}

#[test]
fn test_concurrent_first_lookup_of_stored_collection_yields_one_instance() {
    let dir = tempdir().unwrap();
    {
        let seed = Storage::new(dir.path()).unwrap();
        seed.find_collection("stored").unwrap().append("t", "from-disk");
        assert!(seed.synchronize().is_clean());
    }

    let storage = Arc::new(Storage::new(dir.path()).unwrap());
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let storage = Arc::clone(&storage);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Loads race each other; only one of them may be registered.
                let c = if i % 2 == 0 {
                    storage.find_collection("stored").unwrap()
                } else {
                    storage.find_existing("STORED").unwrap().expect("document exists")
                };
                c.append("t", i.to_string());
                c
            })
        })
        .collect();
    let instances: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for c in &instances[1..] {
        assert!(Arc::ptr_eq(&instances[0], c));
    }
    let list = instances[0].list("t");
    assert_eq!(list[0], "from-disk");
    assert_eq!(list.len(), THREADS + 1);
    assert_eq!(storage.collection_names(), vec!["stored"]);
}

#[test]
fn test_missing_lookup_sees_collection_created_meanwhile() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(Storage::new(dir.path()).unwrap());
    let barrier = Arc::new(Barrier::new(2));

    let creator = {
        let storage = Arc::clone(&storage);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            storage.find_collection("fresh").unwrap()
        })
    };
    barrier.wait();
    let seen = storage.find_existing("fresh").unwrap();
    let created = creator.join().unwrap();

    // Either the lookup ran first and saw nothing, or it got the same instance.
    if let Some(seen) = seen {
        assert!(Arc::ptr_eq(&seen, &created));
    }
    assert!(Arc::ptr_eq(&storage.find_existing("fresh").unwrap().unwrap(), &created));
    assert!(!dir.path().join("fresh.json").exists());
}

#[test]
fn test_saves_racing_mutations_never_lose_updates() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(Storage::new(dir.path()).unwrap());
    let collection = storage.find_collection("race").unwrap();

    let writer = {
        let collection = Arc::clone(&collection);
        thread::spawn(move || {
            for i in 0..200 {
                collection.append("t", i.to_string());
            }
        })
    };
    let syncer = {
        let storage = Arc::clone(&storage);
        thread::spawn(move || {
            for _ in 0..20 {
                assert!(storage.synchronize().is_clean());
            }
        })
    };
    writer.join().unwrap();
    syncer.join().unwrap();

    // Whatever the interleaving, one more pass brings disk up to date.
    assert!(storage.synchronize().is_clean());
    assert!(!collection.is_dirty());

    let reopened = Storage::new(dir.path()).unwrap();
    let reloaded = reopened.find_existing("race").unwrap().unwrap();
    assert_eq!(reloaded.count("t"), 200);
    assert_eq!(reloaded.list("t"), collection.list("t"));
}
