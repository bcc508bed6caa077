//! Event routing: resolves the data source an event belongs to and dispatches
//! it to the handlers registered for that source.
//!
//! Handlers assume events arrive one at a time in chain order. The runtime
//! does not enforce that; callers either deliver sequentially themselves or
//! go through [`crate::pipeline::EventPipeline`].

use std::sync::{Arc, Mutex};

use crate::config::Manifest;
use crate::error::MappingError;
use crate::handler::{HandlerRegistry, MappingContext};
use crate::store::{EntityStore, TemplateRegistry};
use crate::types::{BlockSummary, DecodedEvent};

/// Counters for processed events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Events that ran at least one handler.
    pub events_handled: u64,
    /// Events from unknown addresses or without a matching handler.
    pub events_skipped: u64,
    /// Total handler invocations.
    pub handler_runs: u64,
}

/// Result of processing one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Handled { data_source: String, handlers: usize },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No static source or tracked template instance matches the address.
    UnknownAddress,
    /// The source is known but has no handler for this event name.
    NoHandler,
}

/// Routes decoded events to mapping handlers.
pub struct MappingRuntime {
    manifest: Manifest,
    handlers: HandlerRegistry,
    store: Arc<dyn EntityStore>,
    templates: Arc<dyn TemplateRegistry>,
    declared_templates: Arc<[String]>,
    stats: Mutex<RuntimeStats>,
}

impl MappingRuntime {
    pub fn new(
        manifest: Manifest,
        handlers: HandlerRegistry,
        store: Arc<dyn EntityStore>,
        templates: Arc<dyn TemplateRegistry>,
    ) -> Self {
        let declared_templates = manifest.templates.iter().map(|t| t.name.clone()).collect();
        Self {
            manifest,
            handlers,
            store,
            templates,
            declared_templates,
            stats: Mutex::new(RuntimeStats::default()),
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Name of the data source `event` belongs to.
    ///
    /// Static sources win over template instances.
    pub async fn resolve_source(&self, event: &DecodedEvent) -> Result<Option<String>, MappingError> {
        if let Some(source) = self.manifest.static_source(event) {
            return Ok(Some(source.name.clone()));
        }
        for template in &self.manifest.templates {
            if self.templates.is_tracked(&template.name, &event.address).await? {
                return Ok(Some(template.name.clone()));
            }
        }
        Ok(None)
    }

    /// Process one event emitted in `block`.
    pub async fn process(
        &self,
        event: &DecodedEvent,
        block: &BlockSummary,
    ) -> Result<Outcome, MappingError> {
        let Some(source) = self.resolve_source(event).await? else {
            tracing::trace!(address = %event.address, schema = %event.schema, "No data source for address");
            self.record(|s| s.events_skipped += 1);
            return Ok(Outcome::Skipped(SkipReason::UnknownAddress));
        };

        if !self.handlers.handles(&source, &event.schema) {
            tracing::debug!(source = %source, schema = %event.schema, "No handler for event");
            self.record(|s| s.events_skipped += 1);
            return Ok(Outcome::Skipped(SkipReason::NoHandler));
        }

        let ctx = MappingContext::new(
            block.clone(),
            source.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.templates),
        )
        .with_templates(Arc::clone(&self.declared_templates));
        let ran = self.handlers.dispatch_event(event, &ctx).await.map_err(|e| {
            tracing::error!(
                source = %source,
                schema = %event.schema,
                block = event.block_number,
                log_index = event.log_index,
                error = %e,
                "Handler failed"
            );
            e
        })?;

        tracing::debug!(
            source = %source,
            schema = %event.schema,
            block = event.block_number,
            handlers = ran,
            "Event handled"
        );
        self.record(|s| {
            s.events_handled += 1;
            s.handler_runs += ran as u64;
        });
        Ok(Outcome::Handled {
            data_source: source,
            handlers: ran,
        })
    }

    /// Snapshot of the counters.
    pub fn stats(&self) -> Result<RuntimeStats, MappingError> {
        self.stats
            .lock()
            .map(|s| s.clone())
            .map_err(|_| MappingError::Pipeline("stats lock poisoned".into()))
    }

    fn record(&self, f: impl FnOnce(&mut RuntimeStats)) {
        match self.stats.lock() {
            Ok(mut stats) => f(&mut stats),
            Err(_) => tracing::error!("Stats lock poisoned, counter update dropped"),
        }
    }
}
