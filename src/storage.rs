// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Registry of collections living under one directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tagstore_persistence::WriteOptions;

use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::sync::Synchronizer;

/// Outcome of one `Storage::synchronize` pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Collections written during this pass.
    pub persisted: Vec<String>,
    /// Collections whose write failed. They stay dirty.
    pub failed: Vec<(String, StoreError)>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Storage {
    config: StoreConfig,
    /// Lower-cased name -> the only instance of that collection. Never held
    /// across disk I/O.
    registry: Mutex<FxHashMap<String, Arc<Collection>>>,
}

impl Storage {
    /// Opens `base_path` with default settings.
    pub fn new(base_path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open(StoreConfig::new(base_path))
    }

    /// Creates `config.base_path` if it does not exist yet.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        fs::create_dir_all(&config.base_path)?;
        tracing::info!("Storage opened at {:?}", config.base_path);
        Ok(Self {
            config,
            registry: Mutex::new(FxHashMap::default()),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    /// Returns the collection, loading it from disk or creating it empty.
    ///
    /// A new collection is not written until its first mutation is
    /// synchronized.
    pub fn find_collection(&self, name: &str) -> StoreResult<Arc<Collection>> {
        let name = normalize_name(name)?;
        if let Some(existing) = self.cached(&name) {
            return Ok(existing);
        }

        let (collection, found) = self.open_collection(&name)?;
        let (collection, inserted) = self.register(name, collection);
        if inserted && !found {
            tracing::info!("Created collection {}", collection.name());
        }
        Ok(collection)
    }

    /// Like `find_collection`, but `None` instead of creating a missing one.
    /// Neither memory nor disk is touched in that case.
    pub fn find_existing(&self, name: &str) -> StoreResult<Option<Arc<Collection>>> {
        self.find_collection_with(name, false)
    }

    pub fn find_collection_with(&self, name: &str, can_create: bool) -> StoreResult<Option<Arc<Collection>>> {
        if can_create {
            return self.find_collection(name).map(Some);
        }

        let name = normalize_name(name)?;
        if let Some(existing) = self.cached(&name) {
            return Ok(Some(existing));
        }

        let (collection, found) = self.open_collection(&name)?;
        if !found {
            // Another caller may have created it while we were looking at disk.
            return Ok(self.cached(&name));
        }
        Ok(Some(self.register(name, collection).0))
    }

    /// Sorted names of every collection acquired so far.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Saves every dirty collection. A failure does not stop the pass; the
    /// failed collection stays dirty and is retried next time.
    pub fn synchronize(&self) -> SyncReport {
        let collections: Vec<Arc<Collection>> = self.registry.lock().values().cloned().collect();
        let mut report = SyncReport::default();

        for collection in collections {
            if !collection.is_dirty() {
                continue;
            }
            let name = collection.name().to_string();
            tracing::debug!("Saving storage for {}...", name);
            match collection.save() {
                Ok(()) => report.persisted.push(name),
                Err(e) => {
                    tracing::error!("Failed to save collection {}: {}", name, e);
                    report.failed.push((name, e));
                }
            }
        }

        report
    }

    /// Starts the background synchronizer if `sync_interval` is configured.
    pub fn start_synchronizer(self: &Arc<Self>) -> StoreResult<Option<Synchronizer>> {
        match self.config.sync_interval {
            Some(interval) => Synchronizer::spawn(Arc::clone(self), interval).map(Some),
            None => Ok(None),
        }
    }

    fn cached(&self, name: &str) -> Option<Arc<Collection>> {
        self.registry.lock().get(name).cloned()
    }

    /// Inserts `collection` unless another caller registered the name first,
    /// in which case that instance wins and `collection` is discarded.
    /// Returns the registered instance and whether it is `collection`.
    fn register(&self, name: String, collection: Collection) -> (Arc<Collection>, bool) {
        let mut registry = self.registry.lock();
        if let Some(existing) = registry.get(&name) {
            return (Arc::clone(existing), false);
        }
        let collection = Arc::new(collection);
        registry.insert(name, Arc::clone(&collection));
        (collection, true)
    }

    fn write_options(&self) -> WriteOptions {
        WriteOptions {
            sync: self.config.sync_writes,
            backup: self.config.keep_backup,
        }
    }

    /// Builds the collection and loads its document, without holding the
    /// registry lock. Load failures abort the acquisition and leave the file
    /// untouched.
    fn open_collection(&self, name: &str) -> StoreResult<(Collection, bool)> {
        let collection = Collection::new(name, self.config.document_path(name))
            .with_write_options(self.write_options());
        let found = collection.load()?;
        Ok((collection, found))
    }
}

/// Lower-cases the name and rejects anything that would escape `base_path`.
fn normalize_name(name: &str) -> StoreResult<String> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(name.to_lowercase())
}
