//! Error types for the mapping runtime.

use thiserror::Error;

/// Errors that can occur while mapping events to entities.
///
/// A missing entity is never an error: loads return `Ok(None)` and the
/// handlers that depend on a prior record skip the event.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Failed to decode '{schema}' params: {reason}")]
    Decode { schema: String, reason: String },

    #[error("Corrupt {entity_type} record '{id}': {reason}")]
    Record {
        entity_type: String,
        id: String,
        reason: String,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Pipeline closed: {0}")]
    Pipeline(String),
}

impl MappingError {
    /// Returns `true` if the error came from an event whose params did not
    /// match the expected shape.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}
