//! dripsindex-storage: entity store backends.
//!
//! Backends:
//! - [`memory`]: in-memory (tests / replay, no persistence)
//! - [`sqlite`]: SQLite via `sqlx` (feature `sqlite`, single-file persistence)
//!
//! Both implement [`EntityStore`](dripsindex_core::EntityStore),
//! [`TemplateRegistry`](dripsindex_core::TemplateRegistry) and [`EntityScan`].

use async_trait::async_trait;

use dripsindex_core::MappingError;

pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::InMemoryStorage;

/// Read-only listing of stored records, used for dumps and inspection.
#[async_trait]
pub trait EntityScan: Send + Sync {
    /// All `(id, record)` pairs of `entity_type`, ordered by id.
    async fn scan(&self, entity_type: &str)
        -> Result<Vec<(String, serde_json::Value)>, MappingError>;

    /// Number of records of `entity_type`.
    async fn count(&self, entity_type: &str) -> Result<u64, MappingError> {
        Ok(self.scan(entity_type).await?.len() as u64)
    }
}
