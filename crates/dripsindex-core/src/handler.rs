//! Event handler traits, the per-event mapping context, and the handler registry.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

use crate::entity::Entity;
use crate::error::MappingError;
use crate::store::{EntityStore, TemplateRegistry};
use crate::types::{BlockSummary, DecodedEvent};

// ─── MappingContext ───────────────────────────────────────────────────────────

/// Everything a handler may touch while processing one event.
pub struct MappingContext {
    /// The block the event was emitted in.
    pub block: BlockSummary,
    /// Name of the data source the event was routed through.
    pub data_source: String,
    store: Arc<dyn EntityStore>,
    templates: Arc<dyn TemplateRegistry>,
    declared_templates: Arc<[String]>,
}

impl MappingContext {
    pub fn new(
        block: BlockSummary,
        data_source: impl Into<String>,
        store: Arc<dyn EntityStore>,
        templates: Arc<dyn TemplateRegistry>,
    ) -> Self {
        Self {
            block,
            data_source: data_source.into(),
            store,
            templates,
            declared_templates: Arc::from(Vec::<String>::new()),
        }
    }

    /// Set the template names `create_template` accepts.
    pub fn with_templates(mut self, declared: Arc<[String]>) -> Self {
        self.declared_templates = declared;
        self
    }

    /// Load an entity by id. Returns `Ok(None)` when absent.
    pub async fn load<E: Entity>(&self, id: &str) -> Result<Option<E>, MappingError> {
        match self.store.load(E::ENTITY_TYPE, id).await? {
            Some(record) => serde_json::from_value(record)
                .map(Some)
                .map_err(|e| MappingError::Record {
                    entity_type: E::ENTITY_TYPE.to_string(),
                    id: id.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Save (upsert) an entity under its own id.
    pub async fn save<E: Entity>(&self, entity: &E) -> Result<(), MappingError> {
        let record = serde_json::to_value(entity).map_err(|e| MappingError::Record {
            entity_type: E::ENTITY_TYPE.to_string(),
            id: entity.id().to_string(),
            reason: e.to_string(),
        })?;
        self.store.save(E::ENTITY_TYPE, entity.id(), record).await
    }

    /// Remove an entity by id.
    pub async fn remove<E: Entity>(&self, id: &str) -> Result<(), MappingError> {
        self.store.remove(E::ENTITY_TYPE, id).await
    }

    /// Ask the host to start tracking `address` as an instance of `template`.
    ///
    /// Fails with [`MappingError::Template`] when `template` is not declared,
    /// since events from the instance could never be routed.
    pub async fn create_template(
        &self,
        template: &str,
        address: Address,
    ) -> Result<(), MappingError> {
        if !self.declared_templates.iter().any(|t| t == template) {
            return Err(MappingError::Template(format!(
                "'{template}' is not declared (instance {address:#x})"
            )));
        }
        tracing::info!(template, address = %address, "Creating data source from template");
        self.templates.create(template, address).await
    }
}

// ─── Traits ───────────────────────────────────────────────────────────────────

/// Trait for event handlers working on the raw decoded event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Called for each event routed to this handler.
    async fn handle(&self, event: &DecodedEvent, ctx: &MappingContext) -> Result<(), MappingError>;

    /// The event name this handler processes (e.g. `"Transfer"`).
    fn schema_name(&self) -> &str;

    /// The data source (static contract or template) this handler belongs to.
    fn data_source(&self) -> &str;
}

/// A handler with strongly-typed event params.
///
/// Register with [`HandlerRegistry::on_mapping`]; params are deserialized
/// from the event before `map` runs and a shape mismatch fails the event.
#[async_trait]
pub trait EventMapping: Send + Sync + 'static {
    type Params: DeserializeOwned + Send;

    /// Event name.
    const SCHEMA: &'static str;
    /// Data source name.
    const DATA_SOURCE: &'static str;

    async fn map(
        &self,
        params: Self::Params,
        event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError>;
}

struct Typed<M>(M);

#[async_trait]
impl<M: EventMapping> EventHandler for Typed<M> {
    async fn handle(&self, event: &DecodedEvent, ctx: &MappingContext) -> Result<(), MappingError> {
        let params = event.params::<M::Params>()?;
        self.0.map(params, event, ctx).await
    }

    fn schema_name(&self) -> &str {
        M::SCHEMA
    }

    fn data_source(&self) -> &str {
        M::DATA_SOURCE
    }
}

// ─── HandlerRegistry ──────────────────────────────────────────────────────────

/// Registry of event handlers keyed by data source and event name.
#[derive(Default)]
pub struct HandlerRegistry {
    event_handlers: HashMap<(String, String), Vec<Arc<dyn EventHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event handler.
    pub fn on_event(&mut self, handler: Arc<dyn EventHandler>) {
        let key = (
            handler.data_source().to_string(),
            handler.schema_name().to_string(),
        );
        self.event_handlers.entry(key).or_default().push(handler);
    }

    /// Register a typed mapping.
    pub fn on_mapping<M: EventMapping>(&mut self, mapping: M) {
        self.on_event(Arc::new(Typed(mapping)));
    }

    /// Returns `true` if any handler exists for `schema` on `data_source`.
    pub fn handles(&self, data_source: &str, schema: &str) -> bool {
        self.event_handlers
            .contains_key(&(data_source.to_string(), schema.to_string()))
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.event_handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatch an event to every handler registered for the context's data
    /// source and the event's name, in registration order.
    ///
    /// Returns the number of handlers that ran.
    pub async fn dispatch_event(
        &self,
        event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<usize, MappingError> {
        let key = (ctx.data_source.clone(), event.schema.clone());
        let Some(handlers) = self.event_handlers.get(&key) else {
            return Ok(0);
        };
        for handler in handlers {
            handler.handle(event, ctx).await?;
        }
        Ok(handlers.len())
    }
}
