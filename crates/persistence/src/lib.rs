// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! On-disk document format for tagstore collections.

pub mod error;
pub mod document;
pub mod fixtures;

pub use document::{discover, read_document, write_document, Document, Entry, WriteOptions};
pub use error::{PersistenceError, Result};
