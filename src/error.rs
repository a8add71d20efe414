// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Error types.

use std::io;
use std::path::PathBuf;
use tagstore_persistence::PersistenceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing document was read but is malformed or fails its checksum.
    #[error("Collection '{name}' at {path:?} is malformed: {source}")]
    Parse {
        name: String,
        path: PathBuf,
        #[source]
        source: PersistenceError,
    },
    /// Backing document exists but could not be read at all (permissions,
    /// not a regular file, ...).
    #[error("Collection '{name}' at {path:?} cannot be read: {source}")]
    Unreadable {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Backing document could not be written. The collection stays dirty.
    #[error("Failed to persist collection '{name}' to {path:?}: {source}")]
    Persist {
        name: String,
        path: PathBuf,
        #[source]
        source: PersistenceError,
    },
    #[error("Invalid collection name: {0:?}")]
    InvalidName(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
pub type Result<T> = StoreResult<T>;
