use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tagstore::StoreConfig;
use tagstore_cli::commands::{edit, inspect, list, verify};
use tagstore_cli::telemetry;

#[derive(Parser)]
#[command(name = "tagstore")]
#[command(about = "Inspect and edit tagstore collections", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// Storage directory.
    #[arg(long, short, env = "TAGSTORE_DIR", default_value = "storage")]
    dir: PathBuf,

    /// Extension of collection documents.
    #[arg(long, default_value = tagstore::config::DEFAULT_EXTENSION)]
    ext: String,
}

impl StoreArgs {
    fn config(&self) -> StoreConfig {
        StoreConfig::new(&self.dir)
            .with_extension(self.ext.clone())
            .with_sync_interval(None)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show every collection in the storage directory and whether it loads.
    Inspect {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Parse one document and check its checksum.
    Verify {
        path: PathBuf,
    },
    /// Print the entries of a collection.
    List {
        #[command(flatten)]
        store: StoreArgs,
        collection: String,
        /// Only this tag.
        tag: Option<String>,
    },
    /// Print the first value stored for a tag.
    Get {
        #[command(flatten)]
        store: StoreArgs,
        collection: String,
        tag: String,
    },
    /// Replace a tag's values with a single value.
    Set {
        #[command(flatten)]
        store: StoreArgs,
        collection: String,
        tag: String,
        value: String,
    },
    /// Add a value to the end of a tag's list.
    Append {
        #[command(flatten)]
        store: StoreArgs,
        collection: String,
        tag: String,
        value: String,
    },
    /// Remove a whole tag, or only the values matching VALUE.
    Remove {
        #[command(flatten)]
        store: StoreArgs,
        collection: String,
        tag: String,
        value: Option<String>,
        /// Match VALUE case-sensitively.
        #[arg(long)]
        exact: bool,
    },
}

fn main() -> anyhow::Result<()> {
    telemetry::init_telemetry();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { store } => inspect::run(&store.dir, &store.ext),
        Commands::Verify { path } => verify::run(&path),
        Commands::List { store, collection, tag } => {
            list::run(store.config(), &collection, tag.as_deref())
        }
        Commands::Get { store, collection, tag } => {
            edit::run(store.config(), &collection, &tag, edit::Edit::Get).map(drop)
        }
        Commands::Set { store, collection, tag, value } => {
            edit::run(store.config(), &collection, &tag, edit::Edit::Set(value)).map(drop)
        }
        Commands::Append { store, collection, tag, value } => {
            edit::run(store.config(), &collection, &tag, edit::Edit::Append(value)).map(drop)
        }
        Commands::Remove { store, collection, tag, value, exact } => {
            edit::run(store.config(), &collection, &tag, edit::Edit::Remove { value, exact }).map(drop)
        }
    }
}
