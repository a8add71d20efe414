// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.

//! tagstore: durable, per-entity multi-value storage for chat bots.
//!
//! A [`Storage`] owns a directory and lazily hands out one [`Collection`]
//! per name. Each collection maps a tag (the canonical id of a user or
//! channel, see [`Tagged`]) to an ordered list of strings and tracks whether
//! it has unsaved changes. [`Storage::synchronize`] writes every dirty
//! collection; a [`Synchronizer`] does so periodically in the background.

pub mod config;
pub mod error;
pub mod sender;
pub mod collection;
pub mod storage;
pub mod sync;

pub use collection::{Collection, Comparison};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use sender::{Platform, Sender, Tagged};
pub use storage::{Storage, SyncReport};
pub use sync::Synchronizer;

#[cfg(test)]
pub mod tests;
