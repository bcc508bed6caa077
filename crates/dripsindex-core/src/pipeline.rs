//! Single-consumer event pipeline.
//!
//! Mappings rely on events being applied one at a time, in order. The
//! pipeline provides that guarantee for standalone use: producers submit
//! [`EventRecord`]s into a bounded channel and exactly one task drains it,
//! running every event to completion before taking the next.
//!
//! The first handler error stops the consumer. Later submits fail with
//! [`MappingError::Pipeline`] and [`EventPipeline::join`] returns the
//! original error.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::MappingError;
use crate::runtime::{MappingRuntime, RuntimeStats};
use crate::types::EventRecord;

/// Handle to a running pipeline.
pub struct EventPipeline {
    tx: mpsc::Sender<EventRecord>,
    worker: JoinHandle<Result<RuntimeStats, MappingError>>,
}

impl EventPipeline {
    /// Spawn the consumer task on the current Tokio runtime.
    pub fn spawn(runtime: Arc<MappingRuntime>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(consume(runtime, rx));
        Self { tx, worker }
    }

    /// Queue an event. Waits while the queue is full.
    pub async fn submit(&self, record: EventRecord) -> Result<(), MappingError> {
        self.tx
            .send(record)
            .await
            .map_err(|_| MappingError::Pipeline("consumer stopped".into()))
    }

    /// Close the queue, wait for every queued event to be processed and
    /// return the final counters.
    pub async fn join(self) -> Result<RuntimeStats, MappingError> {
        drop(self.tx);
        self.worker
            .await
            .map_err(|e| MappingError::Pipeline(e.to_string()))?
    }
}

async fn consume(
    runtime: Arc<MappingRuntime>,
    mut rx: mpsc::Receiver<EventRecord>,
) -> Result<RuntimeStats, MappingError> {
    while let Some(record) = rx.recv().await {
        runtime.process(&record.event, &record.block).await?;
    }
    let stats = runtime.stats()?;
    tracing::info!(
        handled = stats.events_handled,
        skipped = stats.events_skipped,
        "Pipeline drained"
    );
    Ok(stats)
}
