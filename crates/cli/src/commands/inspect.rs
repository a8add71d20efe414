use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use std::path::Path;
use tagstore_persistence::{discover, read_document, PersistenceError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Health {
    Ok,
    Corrupt(String),
    ChecksumMismatch,
}

#[derive(Debug, Clone)]
pub struct CollectionStatus {
    pub name: String,
    pub health: Health,
    pub tags: usize,
    pub values: usize,
    pub modified: Option<String>,
}

/// Reads every collection document under `dir`.
pub fn scan(dir: &Path, extension: &str) -> anyhow::Result<Vec<CollectionStatus>> {
    let mut found = Vec::new();

    for path in discover(dir, extension)? {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .ok()
            .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339_opts(chrono::SecondsFormat::Secs, true));

        let (health, tags, values) = match read_document(&path) {
            Ok(Some(doc)) => (Health::Ok, doc.entries.len(), doc.value_count()),
            // Removed between discovery and read.
            Ok(None) => continue,
            Err(PersistenceError::ChecksumMismatch { .. }) => (Health::ChecksumMismatch, 0, 0),
            Err(e) => (Health::Corrupt(e.to_string()), 0, 0),
        };

        found.push(CollectionStatus {
            name,
            health,
            tags,
            values,
            modified,
        });
    }

    Ok(found)
}

pub fn run(dir: &Path, extension: &str) -> anyhow::Result<()> {
    let statuses = scan(dir, extension)?;

    println!("\nStorage Report: {}", dir.display());
    println!("--------------------");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Collection", "Status", "Tags", "Values", "Modified", "Details"]);

    for s in &statuses {
        let (status, details) = match &s.health {
            Health::Ok => ("OK", String::new()),
            Health::ChecksumMismatch => ("CHECKSUM MISMATCH", "edited outside tagstore?".to_string()),
            Health::Corrupt(reason) => ("CORRUPT", reason.clone()),
        };
        table.add_row(vec![
            s.name.clone(),
            status.to_string(),
            s.tags.to_string(),
            s.values.to_string(),
            s.modified.clone().unwrap_or_default(),
            details,
        ]);
    }

    if statuses.is_empty() {
        println!("No collections found.\n");
    } else {
        println!("{table}\n");
    }

    Ok(())
}
