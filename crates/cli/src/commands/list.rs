use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use tagstore::{Storage, StoreConfig};

/// Prints one collection, or a single tag of it.
pub fn run(config: StoreConfig, collection: &str, tag: Option<&str>) -> anyhow::Result<()> {
    let storage = Storage::open(config)?;
    let Some(collection) = storage.find_existing(collection)? else {
        anyhow::bail!("Collection '{}' not found in {}", collection, storage.base_path().display());
    };

    let entries = match tag {
        Some(tag) => vec![(tag.to_string(), collection.list(tag))],
        None => collection.entries(),
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tag", "#", "Value"]);

    for (tag, values) in entries {
        for (i, value) in values.iter().enumerate() {
            table.add_row(vec![tag.clone(), i.to_string(), value.clone()]);
        }
    }

    println!("\nCollection: {} ({} tags)\n", collection.name(), collection.len());
    println!("{table}\n");
    Ok(())
}
