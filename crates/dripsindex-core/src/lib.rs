//! dripsindex-core: foundation for the funding/drips event mappings.
//!
//! # Architecture
//!
//! ```text
//! EventPipeline (single consumer) → MappingRuntime
//!                                      ├── Manifest         (static sources + templates)
//!                                      ├── HandlerRegistry  (per source + event name)
//!                                      ├── EntityStore      (host key-value store)
//!                                      └── TemplateRegistry (dynamic data sources)
//! ```

pub mod builder;
pub mod config;
pub mod entity;
pub mod error;
pub mod handler;
pub mod pipeline;
pub mod runtime;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use builder::IndexerBuilder;
pub use config::{DataSource, IndexerConfig, Manifest, TemplateSource};
pub use entity::Entity;
pub use error::MappingError;
pub use handler::{EventHandler, EventMapping, HandlerRegistry, MappingContext};
pub use pipeline::EventPipeline;
pub use runtime::{MappingRuntime, Outcome, RuntimeStats, SkipReason};
pub use store::{EntityStore, TemplateRegistry};
pub use types::{BlockSummary, DecodedEvent, EventRecord};
