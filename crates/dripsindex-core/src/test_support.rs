//! Minimal store and template registry for unit tests.

use alloy_primitives::Address;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::MappingError;
use crate::store::{EntityStore, TemplateRegistry};

#[derive(Default)]
pub struct MapStore {
    pub records: Mutex<HashMap<(String, String), serde_json::Value>>,
}

#[async_trait]
impl EntityStore for MapStore {
    async fn load(&self, t: &str, id: &str) -> Result<Option<serde_json::Value>, MappingError> {
        Ok(self.records.lock().unwrap().get(&(t.to_string(), id.to_string())).cloned())
    }

    async fn save(&self, t: &str, id: &str, r: serde_json::Value) -> Result<(), MappingError> {
        self.records.lock().unwrap().insert((t.into(), id.into()), r);
        Ok(())
    }

    async fn remove(&self, t: &str, id: &str) -> Result<(), MappingError> {
        self.records.lock().unwrap().remove(&(t.to_string(), id.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct ListTemplates(pub Mutex<Vec<(String, Address)>>);

#[async_trait]
impl TemplateRegistry for ListTemplates {
    async fn create(&self, t: &str, a: Address) -> Result<(), MappingError> {
        self.0.lock().unwrap().push((t.into(), a));
        Ok(())
    }

    async fn is_tracked(&self, t: &str, a: &Address) -> Result<bool, MappingError> {
        Ok(self.0.lock().unwrap().iter().any(|(n, x)| n == t && x == a))
    }

    async fn instances(&self, t: &str) -> Result<Vec<Address>, MappingError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|(n, _)| n == t)
            .map(|(_, a)| *a)
            .collect())
    }
}
