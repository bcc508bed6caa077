//! dripsindex CLI: replay decoded funding events and inspect the result.
//!
//! Usage:
//! ```bash
//! dripsindex replay --manifest manifest.yaml --events events.jsonl
//! dripsindex replay --manifest manifest.yaml --events events.jsonl --dump Token
//! dripsindex replay --manifest manifest.yaml --events events.jsonl --sqlite drips.db
//! dripsindex info
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use dripsindex_core::entity::ENTITY_TYPES;
use dripsindex_core::HandlerRegistry;
use dripsindex_mappings::{DAI_DRIPS_HUB, DRIPS_TOKEN, RADICLE_REGISTRY};

mod cmd_replay;
mod logging;

#[derive(Parser)]
#[command(
    name = "dripsindex",
    about = "Radicle funding / drips event mappings",
    long_about = "
dripsindex: apply decoded RadicleRegistry, DaiDripsHub and DripsToken events
to funding entities (projects, drips, splits, token types, tokens).

ENVIRONMENT VARIABLES:
  RUST_LOG    tracing filter directives, overrides --log-level
",
    version
)]
struct Cli {
    /// Log level or filter directives (e.g. `debug`, `info,dripsindex_core=trace`)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines event log through the mappings
    Replay {
        /// Manifest YAML (data sources and templates)
        #[arg(short, long)]
        manifest: PathBuf,
        /// Event log, one `{"block": .., "event": ..}` record per line
        #[arg(short, long)]
        events: PathBuf,
        /// Persist entities to this SQLite file instead of memory
        #[arg(long)]
        sqlite: Option<String>,
        /// Print every record of this entity type as JSON after the replay
        #[arg(long)]
        dump: Option<String>,
        /// Override the manifest's pipeline queue capacity
        #[arg(long)]
        channel_capacity: Option<usize>,
    },

    /// Show registered sources, handlers and entity types
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.json_logs);

    match cli.command {
        Commands::Replay {
            manifest,
            events,
            sqlite,
            dump,
            channel_capacity,
        } => {
            cmd_replay::run(cmd_replay::ReplayArgs {
                manifest: &manifest,
                events: &events,
                sqlite: sqlite.as_deref(),
                dump: dump.as_deref(),
                channel_capacity,
            })
            .await
        }
        Commands::Info => {
            cmd_info();
            Ok(())
        }
    }
}

fn cmd_info() {
    let mut handlers = HandlerRegistry::new();
    dripsindex_mappings::register_all(&mut handlers);

    println!("dripsindex v{}", env!("CARGO_PKG_VERSION"));
    println!("  Static sources: {RADICLE_REGISTRY}, {DAI_DRIPS_HUB}");
    println!("  Templates: {DRIPS_TOKEN}");
    println!("  Handlers registered: {}", handlers.len());
    println!("  Entity types: {}", ENTITY_TYPES.join(", "));
    println!(
        "  Storage backends: memory, SQLite ({})",
        if cfg!(feature = "sqlite") { "enabled" } else { "feature: sqlite" }
    );
}
