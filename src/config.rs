// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Storage configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// File extension of collection documents.
pub const DEFAULT_EXTENSION: &str = "json";

/// Interval between background synchronizations.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one document per collection.
    pub base_path: PathBuf,
    pub extension: String,
    /// `None` disables the background synchronizer.
    pub sync_interval: Option<Duration>,
    /// fsync each document before it replaces the previous one.
    pub sync_writes: bool,
    /// Keep the previous document as `<name>.<ext>.prev`.
    pub keep_backup: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("storage"),
            extension: DEFAULT_EXTENSION.to_string(),
            sync_interval: Some(DEFAULT_SYNC_INTERVAL),
            sync_writes: true,
            keep_backup: false,
        }
    }
}

impl StoreConfig {
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_sync_interval(mut self, interval: Option<Duration>) -> Self {
        self.sync_interval = interval;
        self
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }

    pub fn with_backup(mut self, keep_backup: bool) -> Self {
        self.keep_backup = keep_backup;
        self
    }

    /// Path of the document backing collection `name`.
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", name, self.extension))
    }
}
