use std::path::Path;
use tagstore_persistence::{read_document, Document};

pub fn run(path: &Path) -> anyhow::Result<()> {
    let document = match read_document(path) {
        Ok(Some(doc)) => doc,
        Ok(None) => anyhow::bail!("{} does not exist", path.display()),
        Err(e) => {
            println!("\n❌ CORRUPTED\n");
            println!("File:   {}", path.display());
            println!("Reason: {}\n", e);
            return Err(e.into());
        }
    };

    match &document.checksum {
        Some(checksum) => {
            println!("\n✅ VERIFIED\n");
            println!("Checksum:   {}", checksum);
        }
        None => {
            println!("\n⚠️  PARSED (no checksum stored)\n");
            println!("Checksum:   {} (computed)", Document::checksum_of(&document.entries));
        }
    }
    println!("Tags:       {}", document.entries.len());
    println!("Values:     {}\n", document.value_count());

    Ok(())
}
