// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Background thread that periodically synchronizes a `Storage`.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::StoreResult;
use crate::storage::{Storage, SyncReport};

/// Stops on `shutdown` or drop, then runs one last synchronize so nothing
/// mutated before shutdown is lost.
pub struct Synchronizer {
    storage: Arc<Storage>,
    stop: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Synchronizer {
    pub fn spawn(storage: Arc<Storage>, interval: Duration) -> StoreResult<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let worker = Arc::clone(&storage);

        let handle = thread::Builder::new()
            .name("tagstore-sync".into())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let report = worker.synchronize();
                        tracing::debug!(
                            "Periodic sync: {} persisted, {} failed",
                            report.persisted.len(),
                            report.failed.len()
                        );
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        tracing::info!("Synchronizer started (every {:?})", interval);
        Ok(Self {
            storage,
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stops the thread and returns the report of the final synchronize.
    pub fn shutdown(mut self) -> SyncReport {
        self.stop_worker();
        self.storage.synchronize()
    }

    fn stop_worker(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Synchronizer thread panicked");
            }
        }
        tracing::info!("Synchronizer stopped");
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop_worker();
            let report = self.storage.synchronize();
            if !report.is_clean() {
                tracing::error!("{} collection(s) could not be saved at shutdown", report.failed.len());
            }
        }
    }
}
