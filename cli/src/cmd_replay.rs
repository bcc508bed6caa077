//! `dripsindex replay`: run a JSON-lines event log through the mappings.
//!
//! Line format:
//! ```json
//! {"block":{"number":100,"timestamp":1600000000},
//!  "event":{"schema":"NewProject","address":"0x...","block_number":100,
//!           "params":{"fundingToken":"0x...","projectOwner":"0x...",
//!                     "dripTokenTemplate":"0x...","name":"radicle"}}}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use dripsindex_core::entity::ENTITY_TYPES;
use dripsindex_core::{
    EntityStore, EventPipeline, EventRecord, HandlerRegistry, IndexerBuilder, IndexerConfig,
    MappingRuntime, RuntimeStats, TemplateRegistry,
};
use dripsindex_storage::{EntityScan, InMemoryStorage};

pub struct ReplayArgs<'a> {
    pub manifest: &'a Path,
    pub events: &'a Path,
    pub sqlite: Option<&'a str>,
    pub dump: Option<&'a str>,
    pub channel_capacity: Option<usize>,
}

pub async fn run(args: ReplayArgs<'_>) -> Result<()> {
    let loaded = IndexerConfig::from_path(args.manifest)
        .with_context(|| format!("loading manifest {}", args.manifest.display()))?;
    let config = IndexerBuilder::from(loaded)
        .channel_capacity_opt(args.channel_capacity)
        .build_config()
        .context("invalid replay options")?;
    tracing::info!(
        id = %config.id,
        chain = %config.chain,
        sources = config.manifest.data_sources.len(),
        templates = config.manifest.templates.len(),
        channel_capacity = config.channel_capacity,
        "Manifest loaded"
    );

    match args.sqlite {
        Some(path) => replay_sqlite(config, path, &args).await,
        None => replay_with(Arc::new(InMemoryStorage::new()), config, &args).await,
    }
}

#[cfg(feature = "sqlite")]
async fn replay_sqlite(config: IndexerConfig, path: &str, args: &ReplayArgs<'_>) -> Result<()> {
    let storage = dripsindex_storage::sqlite::SqliteStorage::open(path)
        .await
        .with_context(|| format!("opening sqlite database {path}"))?;
    replay_with(Arc::new(storage), config, args).await
}

#[cfg(not(feature = "sqlite"))]
async fn replay_sqlite(_config: IndexerConfig, _path: &str, _args: &ReplayArgs<'_>) -> Result<()> {
    anyhow::bail!("--sqlite requires the `sqlite` feature (cargo build --features sqlite)")
}

async fn replay_with<S>(storage: Arc<S>, config: IndexerConfig, args: &ReplayArgs<'_>) -> Result<()>
where
    S: EntityStore + TemplateRegistry + EntityScan + 'static,
{
    let mut handlers = HandlerRegistry::new();
    dripsindex_mappings::register_all(&mut handlers);

    let runtime = MappingRuntime::new(config.manifest, handlers, storage.clone(), storage.clone());
    let pipeline = EventPipeline::spawn(Arc::new(runtime), config.channel_capacity);

    let submitted = feed(&pipeline, args.events).await;
    // A stopped consumer carries the underlying error; surface it first.
    let stats = pipeline.join().await.context("replay failed")?;
    let submitted = submitted?;

    print_stats(submitted, &stats);
    for entity_type in ENTITY_TYPES {
        println!("  {:<16} {}", entity_type, storage.count(entity_type).await?);
    }

    if let Some(entity_type) = args.dump {
        dump(storage.as_ref(), entity_type).await?;
    }
    Ok(())
}

/// Submit every record in `path`, returning how many were queued.
async fn feed(pipeline: &EventPipeline, path: &Path) -> Result<u64> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening event log {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();

    let mut line_no = 0u64;
    let mut submitted = 0u64;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record: EventRecord = serde_json::from_str(line)
            .with_context(|| format!("{}:{line_no}: invalid event record", path.display()))?;
        pipeline.submit(record).await?;
        submitted += 1;
    }
    Ok(submitted)
}

fn print_stats(submitted: u64, stats: &RuntimeStats) {
    println!("Replayed {submitted} events");
    println!("  handled          {}", stats.events_handled);
    println!("  skipped          {}", stats.events_skipped);
    println!("  handler runs     {}", stats.handler_runs);
    println!("Entities:");
}

async fn dump<S: EntityScan + ?Sized>(storage: &S, entity_type: &str) -> Result<()> {
    if !ENTITY_TYPES.contains(&entity_type) {
        tracing::warn!(entity_type, "Not a known entity type");
    }
    for (_, record) in storage.scan(entity_type).await? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
