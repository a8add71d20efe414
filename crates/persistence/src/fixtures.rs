use crate::document::{write_document, Document, Entry, WriteOptions};
use crate::error::Result;

use std::fs;
use std::path::{Path, PathBuf};

pub struct TestPaths {
    pub dir: PathBuf,
    pub reminders: PathBuf,
    pub prefs: PathBuf,
    pub corrupt: PathBuf,
}

fn entry(key: &str, items: &[&str]) -> Entry {
    Entry {
        key: key.to_string(),
        items: items.iter().map(|s| s.to_string()).collect(),
    }
}

/// Two healthy collections and one unreadable one.
///
/// - `reminders.json`: 2 tags, 3 values
/// - `prefs.json`: 1 tag, 1 value
/// - `broken.json`: truncated JSON
pub fn write_sample_storage(dir: &Path) -> Result<TestPaths> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }

    let opts = WriteOptions { sync: false, backup: false };

    let reminders = dir.join("reminders.json");
    let doc = Document::from_entries(vec![
        entry("discord:100", &["water plants", "call mom"]),
        entry("telegram:7", &["standup at 9"]),
    ]);
    write_document(&reminders, &doc, opts)?;

    let prefs = dir.join("prefs.json");
    let doc = Document::from_entries(vec![entry("discord:100", &["lang=en"])]);
    write_document(&prefs, &doc, opts)?;

    let corrupt = dir.join("broken.json");
    fs::write(&corrupt, "{\"entries\": [{\"key\": \"discord:1\", \"items\": [")?;

    Ok(TestPaths {
        dir: dir.to_path_buf(),
        reminders,
        prefs,
        corrupt,
    })
}
