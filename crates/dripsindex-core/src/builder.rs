//! Fluent builder API for indexer configs.
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::Address;
//! use dripsindex_core::IndexerBuilder;
//!
//! let config = IndexerBuilder::new()
//!     .id("radicle-funding")
//!     .chain("mainnet")
//!     .data_source("DaiDripsHub", Address::ZERO, 11_000_000)
//!     .template("DripsToken")
//!     .build_config()
//!     .unwrap();
//! assert_eq!(config.manifest.data_sources.len(), 1);
//! ```

use alloy_primitives::Address;

use crate::config::{IndexerConfig, Manifest};
use crate::error::MappingError;

/// Fluent builder for `IndexerConfig`.
#[derive(Default)]
pub struct IndexerBuilder {
    config: IndexerConfig,
}

impl IndexerBuilder {
    pub fn new() -> Self {
        Self {
            config: IndexerConfig::default(),
        }
    }

    /// Set the indexer ID.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.config.id = id.into();
        self
    }

    /// Set the chain slug.
    pub fn chain(mut self, chain: impl Into<String>) -> Self {
        self.config.chain = chain.into();
        self
    }

    /// Set the pipeline queue capacity.
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.config.channel_capacity = capacity;
        self
    }

    /// Add a static data source.
    pub fn data_source(mut self, name: impl Into<String>, address: Address, start_block: u64) -> Self {
        self.config.manifest = self.config.manifest.data_source(name, address, start_block);
        self
    }

    /// Declare a template.
    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.config.manifest = self.config.manifest.template(name);
        self
    }

    /// Replace the whole manifest.
    pub fn manifest(mut self, manifest: Manifest) -> Self {
        self.config.manifest = manifest;
        self
    }

    /// Set the pipeline queue capacity when `capacity` is given.
    pub fn channel_capacity_opt(self, capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => self.channel_capacity(capacity),
            None => self,
        }
    }

    /// Validate and build the `IndexerConfig`.
    pub fn build_config(self) -> Result<IndexerConfig, MappingError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Start from a loaded config, e.g. to apply command-line overrides.
impl From<IndexerConfig> for IndexerBuilder {
    fn from(config: IndexerConfig) -> Self {
        Self { config }
    }
}
