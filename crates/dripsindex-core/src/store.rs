//! Store traits supplied by the host.
//!
//! The mapping layer never owns persistence. It reads and writes records
//! through [`EntityStore`] and asks the host to start tracking new contract
//! instances through [`TemplateRegistry`].

use alloy_primitives::Address;
use async_trait::async_trait;

use crate::error::MappingError;

/// Key-value entity store addressed by entity type and id.
///
/// Implementations include `InMemoryStorage` and `SqliteStorage` in
/// `dripsindex-storage`.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Load a record. A missing record is `Ok(None)`, not an error.
    async fn load(
        &self,
        entity_type: &str,
        id: &str,
    ) -> Result<Option<serde_json::Value>, MappingError>;

    /// Save (upsert) a record.
    async fn save(
        &self,
        entity_type: &str,
        id: &str,
        record: serde_json::Value,
    ) -> Result<(), MappingError>;

    /// Remove a record. Removing a missing record is not an error.
    async fn remove(&self, entity_type: &str, id: &str) -> Result<(), MappingError>;
}

/// Registry of dynamically created data sources.
///
/// `create` is irreversible: once an address is registered for a template,
/// every later event it emits is routed to that template's handlers.
#[async_trait]
pub trait TemplateRegistry: Send + Sync {
    /// Start tracking `address` as an instance of `template`.
    async fn create(&self, template: &str, address: Address) -> Result<(), MappingError>;

    /// Returns `true` if `address` is a tracked instance of `template`.
    async fn is_tracked(&self, template: &str, address: &Address) -> Result<bool, MappingError>;

    /// All tracked instances of `template`, in creation order.
    async fn instances(&self, template: &str) -> Result<Vec<Address>, MappingError>;
}
