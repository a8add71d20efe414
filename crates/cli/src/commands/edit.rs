use tagstore::{Comparison, Storage, StoreConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Get,
    Set(String),
    Append(String),
    /// Whole tag when `None`, otherwise matching values.
    Remove { value: Option<String>, exact: bool },
}

/// Applies one edit and synchronizes. Returns the line printed to stdout.
pub fn run(config: StoreConfig, collection: &str, tag: &str, edit: Edit) -> anyhow::Result<String> {
    let storage = Storage::open(config.with_sync_interval(None))?;

    let output = match edit {
        Edit::Get => {
            let value = storage
                .find_existing(collection)?
                .and_then(|c| c.get(tag));
            value.unwrap_or_else(|| "(none)".to_string())
        }
        Edit::Set(value) => {
            let changed = storage.find_collection(collection)?.set(tag, value.as_str());
            let status = if changed { "updated" } else { "unchanged" };
            status.to_string()
        }
        Edit::Append(value) => {
            let c = storage.find_collection(collection)?;
            c.append(tag, value);
            format!("{} value(s)", c.count(tag))
        }
        Edit::Remove { value, exact } => {
            let Some(c) = storage.find_existing(collection)? else {
                anyhow::bail!("Collection '{}' not found", collection);
            };
            let removed = match value {
                None => c.remove(tag),
                Some(v) => {
                    let comparison = if exact { Comparison::Exact } else { Comparison::IgnoreCase };
                    c.remove_value_with(tag, &v, comparison)
                }
            };
            let status = if removed { "removed" } else { "nothing to remove" };
            status.to_string()
        }
    };

    let report = storage.synchronize();
    if let Some((name, e)) = report.failed.into_iter().next() {
        return Err(anyhow::Error::new(e).context(format!("saving collection '{}'", name)));
    }

    println!("{}", output);
    Ok(output)
}
