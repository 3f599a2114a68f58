use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use glimpse_store::{history_for, latest_visitor_id, ProfileStore};

#[derive(Parser)]
#[command(name = "glimpse", about = "Glimpse visitor store inspection")]
struct Cli {
    /// Path to the SQLite database file (defaults to $GLIMPSE_DB_PATH,
    /// then ./data/glimpse.db).
    #[arg(long)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the most recently active visitor
    Latest,
    /// Print the recent purchase history for a visitor
    History {
        /// Visitor identifier (64-char hex digest)
        id: String,
    },
    /// Print store statistics
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let db_path = cli
        .db
        .or_else(|| std::env::var("GLIMPSE_DB_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("./data/glimpse.db"));

    let store = ProfileStore::open(&db_path)
        .with_context(|| format!("opening store at {}", db_path.display()))?;

    match cli.command {
        Commands::Latest => match store.find_latest()? {
            Some(visitor) => {
                println!("{}", visitor.id);
                println!("  first seen: {}", format_ts(visitor.first_seen_ts));
                println!("  last seen:  {}", format_ts(visitor.last_seen_ts));
            }
            None => println!("no visitors yet"),
        },
        Commands::History { id } => {
            let now = unix_now();
            let history = history_for(&store, &id, now)?;
            if history.is_empty() {
                println!("no history for {id}");
            } else {
                for entry in history {
                    println!(
                        "{}  {:<20} x{}  ({} ago)",
                        format_ts(entry.ts),
                        entry.sku,
                        entry.quantity,
                        entry.ago
                    );
                }
            }
        }
        Commands::Stats => {
            println!("visitors:     {}", store.visitor_count()?);
            println!("transactions: {}", store.transaction_count()?);
            if let Some(id) = latest_visitor_id(&store)? {
                println!("latest:       {id}");
            }
        }
    }

    Ok(())
}

fn format_ts(ts: i64) -> String {
    match Utc.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("@{ts}"),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
