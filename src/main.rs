//! Idcache CLI - Command-line interface for the file-identifier cache

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use idcache::config::{self, IdcacheConfig};
use idcache::FileIdStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "idcache")]
#[command(version)]
#[command(about = "Durable cache mapping content keys to resolved file identifiers")]
#[command(long_about = r#"
Idcache persists a mapping from content keys to file identifiers handed back
by an external resolution system, so identifiers can be reused instead of
re-uploading or re-fetching the content.

Example usage:
  idcache init
  idcache put hash:abc123 tg:FILE_789
  idcache get hash:abc123
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the cache database file (overrides config and environment)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file and create the empty cache database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Cache a file identifier under a content key
    Put {
        /// Content key (e.g. a hash of the source bytes or a source URL)
        key: String,

        /// Opaque file identifier to cache
        file_id: String,
    },

    /// Look up the cached identifier for a content key
    Get {
        /// Content key
        key: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Remove a cached entry
    Delete {
        /// Content key
        key: String,
    },

    /// Show cache statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let loaded = config::load_config(None)?;
    let db_path = config::resolve_database_path(cli.database, loaded.as_ref());

    match cli.command {
        Commands::Init { force } => {
            let cfg = IdcacheConfig {
                database: Some(db_path.display().to_string()),
            };
            config::write_config(&config::default_config_path(), &cfg, force)?;
            config::ensure_db_dir(&db_path)?;

            let store = FileIdStore::open(&db_path)?;
            store.close()?;
            println!("🗄️  Initialized cache at {}", db_path.display());
        }

        Commands::Put { key, file_id } => {
            config::ensure_db_dir(&db_path)?;
            let store = FileIdStore::open(&db_path)?;

            let entry = store.put(&key, &file_id)?;
            tracing::debug!("cached {} -> {}", entry.key, entry.file_id);
            println!("{} -> {} (cached at {})", entry.key, entry.file_id, entry.created_at);

            store.close()?;
        }

        Commands::Get { key, format } => {
            let store = FileIdStore::open(&db_path)?;

            match store.get(&key)? {
                Some(entry) => {
                    if format == "json" {
                        println!("{}", serde_json::to_string_pretty(&entry)?);
                    } else {
                        println!("{}", entry.file_id);
                    }
                }
                None => {
                    println!("∅ Nothing cached for '{}'.", key);
                }
            }

            store.close()?;
        }

        Commands::Delete { key } => {
            let store = FileIdStore::open(&db_path)?;

            if store.delete(&key)? {
                println!("Removed '{}'.", key);
            } else {
                println!("∅ Nothing cached for '{}'.", key);
            }

            store.close()?;
        }

        Commands::Stats => {
            let store = FileIdStore::open(&db_path)?;

            println!("📊 Idcache Statistics ({:?})", db_path);
            println!("------------------------------------");
            println!("{}", store.stats()?);

            store.close()?;
        }
    }

    Ok(())
}
