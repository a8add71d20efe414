// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! A named keystore of tag -> ordered value list, backed by one document.
//!
//! All keystore access goes through `state`. Saves additionally hold
//! `persist`, so two saves never interleave their writes and mutations never
//! wait on disk I/O. Lock order is always `persist` then `state`.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tagstore_persistence::{read_document, write_document, Document, Entry, PersistenceError, WriteOptions};

use crate::error::{StoreError, StoreResult};
use crate::sender::Tagged;

/// How `remove_value_with` matches stored values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    /// Case-insensitive, by simple upper-case mapping of every char.
    #[default]
    IgnoreCase,
    Exact,
}

impl Comparison {
    pub fn matches(self, stored: &str, wanted: &str) -> bool {
        match self {
            Comparison::Exact => stored == wanted,
            Comparison::IgnoreCase => stored
                .chars()
                .flat_map(char::to_uppercase)
                .eq(wanted.chars().flat_map(char::to_uppercase)),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    /// Never holds an empty list.
    keystore: FxHashMap<String, Vec<String>>,
    /// Bumped by every mutation.
    revision: u64,
    /// Revision last written to disk (or loaded from it).
    persisted: u64,
}

impl State {
    fn touch(&mut self) {
        self.revision += 1;
    }

    fn is_dirty(&self) -> bool {
        self.revision != self.persisted
    }
}

#[derive(Debug)]
pub struct Collection {
    name: String,
    path: PathBuf,
    write_options: WriteOptions,
    state: Mutex<State>,
    persist: Mutex<()>,
}

impl Collection {
    /// An empty, clean collection. Nothing touches the disk until `load` or `save`.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            write_options: WriteOptions::default(),
            state: Mutex::new(State::default()),
            persist: Mutex::new(()),
        }
    }

    pub fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.write_options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True while in-memory state has mutations not yet written to `path`.
    pub fn is_dirty(&self) -> bool {
        self.state.lock().is_dirty()
    }

    /// Replaces the keystore with the backing document's content.
    ///
    /// Returns `Ok(false)` and leaves the keystore alone when the document
    /// does not exist. A document that exists but cannot be read
    /// (`Unreadable`) or parsed (`Parse`) is an error, never an empty
    /// collection.
    pub fn load(&self) -> StoreResult<bool> {
        let _persist = self.persist.lock();
        let mut state = self.state.lock();

        let document = read_document(&self.path).map_err(|source| match source {
            PersistenceError::IoError(source) => StoreError::Unreadable {
                name: self.name.clone(),
                path: self.path.clone(),
                source,
            },
            source => StoreError::Parse {
                name: self.name.clone(),
                path: self.path.clone(),
                source,
            },
        })?;
        let Some(document) = document else {
            return Ok(false);
        };

        let mut keystore = FxHashMap::default();
        for entry in document.entries {
            if entry.items.is_empty() {
                tracing::warn!("Skipping empty entry {:?} in collection {}", entry.key, self.name);
                continue;
            }
            // Duplicate keys: the last occurrence wins.
            keystore.insert(entry.key, entry.items);
        }

        tracing::info!("Loaded collection {} ({} tags) from {:?}", self.name, keystore.len(), self.path);
        state.keystore = keystore;
        state.persisted = state.revision;
        Ok(true)
    }

    /// Writes the keystore to the backing document, sorted by tag.
    ///
    /// On failure the collection stays dirty. If a mutation lands while the
    /// write is in flight the collection also stays dirty, so the next save
    /// picks it up.
    pub fn save(&self) -> StoreResult<()> {
        let _persist = self.persist.lock();

        let (mut entries, revision) = {
            let state = self.state.lock();
            let entries: Vec<Entry> = state
                .keystore
                .iter()
                .map(|(key, items)| Entry {
                    key: key.clone(),
                    items: items.clone(),
                })
                .collect();
            (entries, state.revision)
        };
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        let tags = entries.len();
        let document = Document::from_entries(entries);

        write_document(&self.path, &document, self.write_options).map_err(|source| {
            StoreError::Persist {
                name: self.name.clone(),
                path: self.path.clone(),
                source,
            }
        })?;

        let mut state = self.state.lock();
        state.persisted = revision;
        tracing::info!("Saved collection {} ({} tags) to {:?}", self.name, tags, self.path);
        Ok(())
    }

    /// Pushes `value` onto the end of the tag's list.
    pub fn append<T: Tagged + ?Sized>(&self, tag: &T, value: impl Into<String>) {
        let tag = tag.tag();
        let mut state = self.state.lock();
        state.keystore.entry(tag.into_owned()).or_default().push(value.into());
        state.touch();
    }

    /// Replaces the tag's list with `[value]`; `None` is stored as `""`.
    ///
    /// Returns false, without marking the collection dirty, when the list
    /// already is exactly `[value]`.
    pub fn set<'v, T: Tagged + ?Sized>(&self, tag: &T, value: impl Into<Option<&'v str>>) -> bool {
        let value = value.into().unwrap_or_default();
        let tag = tag.tag();
        let mut state = self.state.lock();

        if let Some(list) = state.keystore.get(&*tag) {
            if list.len() == 1 && list[0] == value {
                return false;
            }
        }

        state.keystore.insert(tag.into_owned(), vec![value.to_string()]);
        state.touch();
        true
    }

    /// Drops the whole entry. Returns whether one existed.
    pub fn remove<T: Tagged + ?Sized>(&self, tag: &T) -> bool {
        let tag = tag.tag();
        let mut state = self.state.lock();
        if state.keystore.remove(&*tag).is_none() {
            return false;
        }
        state.touch();
        true
    }

    /// Case-insensitive `remove_value_with`.
    pub fn remove_value<T: Tagged + ?Sized>(&self, tag: &T, value: &str) -> bool {
        self.remove_value_with(tag, value, Comparison::default())
    }

    /// Removes every element matching `value`. The entry goes away with its
    /// last element. Returns whether anything was removed.
    pub fn remove_value_with<T: Tagged + ?Sized>(&self, tag: &T, value: &str, comparison: Comparison) -> bool {
        let tag = tag.tag();
        let mut state = self.state.lock();

        let Some(list) = state.keystore.get_mut(&*tag) else {
            return false;
        };
        let before = list.len();
        list.retain(|item| !comparison.matches(item, value));
        let after = list.len();

        if after == before {
            return false;
        }
        if after == 0 {
            state.keystore.remove(&*tag);
        }
        state.touch();
        true
    }

    /// First value of the tag's list.
    pub fn get<T: Tagged + ?Sized>(&self, tag: &T) -> Option<String> {
        let tag = tag.tag();
        let state = self.state.lock();
        state.keystore.get(&*tag).and_then(|list| list.first().cloned())
    }

    /// Copy of the tag's list, empty when absent.
    pub fn list<T: Tagged + ?Sized>(&self, tag: &T) -> Vec<String> {
        let tag = tag.tag();
        let state = self.state.lock();
        state.keystore.get(&*tag).cloned().unwrap_or_default()
    }

    pub fn contains<T: Tagged + ?Sized>(&self, tag: &T) -> bool {
        let tag = tag.tag();
        self.state.lock().keystore.contains_key(&*tag)
    }

    pub fn count<T: Tagged + ?Sized>(&self, tag: &T) -> usize {
        let tag = tag.tag();
        self.state.lock().keystore.get(&*tag).map_or(0, Vec::len)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.state.lock().keystore.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().keystore.is_empty()
    }

    /// Sorted tag names.
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.state.lock().keystore.keys().cloned().collect();
        tags.sort();
        tags
    }

    /// Sorted copy of every entry.
    pub fn entries(&self) -> Vec<(String, Vec<String>)> {
        let mut entries: Vec<(String, Vec<String>)> = self
            .state
            .lock()
            .keystore
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Calls `visitor` once per entry on a snapshot taken under the lock.
    ///
    /// The lock is released before the first call, so the visitor may read
    /// or mutate this collection. Such mutations are not reflected in the
    /// ongoing visit.
    pub fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&str, &[String]),
    {
        for (tag, values) in self.entries() {
            visitor(&tag, &values);
        }
    }
}
