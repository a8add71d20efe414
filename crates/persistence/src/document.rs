// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use crate::error::{PersistenceError, Result};
use crc64fast::Digest;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One tag and its ordered values.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    #[serde(default)]
    pub items: Vec<String>,
}

/// Root container of a collection file.
///
/// ```json
/// {
///   "checksum": "9f3a0c1d2e4b5a68",
///   "entries": [
///     { "key": "discord:42", "items": ["first", "second"] }
///   ]
/// }
/// ```
///
/// `checksum` is optional so hand-written documents still load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub entries: Vec<Entry>,
}

impl Document {
    /// Builds a document and stamps its checksum.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = Entry>,
    {
        let entries: Vec<Entry> = entries.into_iter().collect();
        let checksum = Self::checksum_of(&entries);
        Self {
            checksum: Some(checksum),
            entries,
        }
    }

    /// CRC-64 over the compact JSON encoding of `entries`, as 16 hex digits.
    pub fn checksum_of(entries: &[Entry]) -> String {
        let mut digest = Digest::new();
        // Vec<Entry> of plain strings cannot fail to encode.
        let encoded = serde_json::to_vec(entries).unwrap_or_default();
        digest.write(&encoded);
        format!("{:016x}", digest.sum64())
    }

    pub fn verify(&self) -> Result<()> {
        let Some(expected) = &self.checksum else {
            return Ok(());
        };
        let found = Self::checksum_of(&self.entries);
        if !expected.eq_ignore_ascii_case(&found) {
            return Err(PersistenceError::ChecksumMismatch {
                expected: expected.clone(),
                found,
            });
        }
        Ok(())
    }

    /// Total number of values across all entries.
    pub fn value_count(&self) -> usize {
        self.entries.iter().map(|e| e.items.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// fsync the temporary file before it replaces the target.
    pub sync: bool,
    /// Copy the previous document to `<file>.prev` before replacing it.
    pub backup: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: true,
            backup: false,
        }
    }
}

/// Parses a document, `Ok(None)` when the file does not exist.
pub fn read_document(path: impl AsRef<Path>) -> Result<Option<Document>> {
    let bytes = match fs::read(path.as_ref()) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let document: Document = serde_json::from_slice(&bytes)
        .map_err(|e| PersistenceError::InvalidFormat(e.to_string()))?;
    document.verify()?;
    Ok(Some(document))
}

/// Writes through a sibling `.tmp` file and renames it into place, so the
/// target path only ever holds a complete document.
pub fn write_document(path: impl AsRef<Path>, document: &Document, options: WriteOptions) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = sibling(path, ".tmp");
    let body = serde_json::to_vec_pretty(document)?;

    let written = (|| -> io::Result<()> {
        let mut file = File::create(&tmp_path)?;
        file.write_all(&body)?;
        file.write_all(b"\n")?;
        if options.sync {
            file.sync_data()?;
        }
        Ok(())
    })();
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if options.backup && path.exists() {
        if let Err(e) = fs::copy(path, sibling(path, ".prev")) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

/// Lists `*.<extension>` files directly under `dir`, sorted by path.
pub fn discover(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == extension) {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
