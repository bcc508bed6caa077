//! In-memory storage backend.
//!
//! Stores entity records and template instances in RAM.
//! Useful for testing and one-shot replays that don't need persistence.

use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use dripsindex_core::{Entity, EntityStore, MappingError, TemplateRegistry};

use crate::EntityScan;

type Tables = HashMap<String, BTreeMap<String, serde_json::Value>>;

/// In-memory entity store and template registry.
///
/// All data is lost when the process exits.
#[derive(Default)]
pub struct InMemoryStorage {
    entities: Mutex<Tables>,
    templates: Mutex<Vec<(String, Address)>>,
}

fn poisoned(what: &str) -> MappingError {
    MappingError::Storage(format!("{what} lock poisoned"))
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, MappingError> {
        self.entities.lock().map_err(|_| poisoned("entity"))
    }

    /// Typed lookup, `None` when absent or not decodable as `E`.
    pub fn get<E: Entity>(&self, id: &str) -> Option<E> {
        let tables = self.tables().ok()?;
        let record = tables.get(E::ENTITY_TYPE)?.get(id)?;
        serde_json::from_value(record.clone()).ok()
    }

    /// Every record of type `E`, ordered by id.
    pub fn all<E: Entity>(&self) -> Vec<E> {
        let Ok(tables) = self.tables() else {
            return vec![];
        };
        tables
            .get(E::ENTITY_TYPE)
            .map(|t| {
                t.values()
                    .filter_map(|r| serde_json::from_value(r.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of records of `entity_type`.
    pub fn len_of(&self, entity_type: &str) -> usize {
        self.tables()
            .map(|t| t.get(entity_type).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }

    /// Total number of records across all entity types.
    pub fn total(&self) -> usize {
        self.tables()
            .map(|t| t.values().map(BTreeMap::len).sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl EntityStore for InMemoryStorage {
    async fn load(
        &self,
        entity_type: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, MappingError> {
        Ok(self
            .tables()?
            .get(entity_type)
            .and_then(|t| t.get(id))
            .cloned())
    }

    async fn save(
        &self,
        entity_type: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), MappingError> {
        self.tables()?
            .entry(entity_type.to_string())
            .or_default()
            .insert(id.to_string(), record);
        Ok(())
    }

    async fn remove(&self, entity_type: &str, id: &str) -> Result<(), MappingError> {
        if let Some(table) = self.tables()?.get_mut(entity_type) {
            table.remove(id);
        }
        Ok(())
    }
}

#[async_trait]
impl TemplateRegistry for InMemoryStorage {
    async fn create(&self, template: &str, address: Address) -> Result<(), MappingError> {
        let mut templates = self.templates.lock().map_err(|_| poisoned("template"))?;
        if templates.iter().any(|(t, a)| t == template && *a == address) {
            tracing::debug!(template, address = %address, "Template instance already tracked");
            return Ok(());
        }
        templates.push((template.to_string(), address));
        Ok(())
    }

    async fn is_tracked(&self, template: &str, address: &Address) -> Result<bool, MappingError> {
        let templates = self.templates.lock().map_err(|_| poisoned("template"))?;
        Ok(templates.iter().any(|(t, a)| t == template && a == address))
    }

    async fn instances(&self, template: &str) -> Result<Vec<Address>, MappingError> {
        let templates = self.templates.lock().map_err(|_| poisoned("template"))?;
        Ok(templates
            .iter()
            .filter(|(t, _)| t == template)
            .map(|(_, a)| *a)
            .collect())
    }
}

#[async_trait]
impl EntityScan for InMemoryStorage {
    async fn scan(
        &self,
        entity_type: &str,
    ) -> Result<Vec<(String, serde_json::Value)>, MappingError> {
        Ok(self
            .tables()?
            .get(entity_type)
            .map(|t| t.iter().map(|(id, r)| (id.clone(), r.clone())).collect())
            .unwrap_or_default())
    }
}
