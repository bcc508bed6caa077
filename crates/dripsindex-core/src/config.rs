//! Indexer configuration and the data-source manifest.
//!
//! ```yaml
//! id: radicle-funding
//! chain: mainnet
//! data_sources:
//!   - name: RadicleRegistry
//!     address: "0x4a7d…"
//!     start_block: 11000000
//!   - name: DaiDripsHub
//!     address: "0x73f0…"
//! templates:
//!   - name: DripsToken
//! ```

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MappingError;
use crate::types::DecodedEvent;

/// A statically known contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    /// Handler group name (e.g. `"DaiDripsHub"`).
    pub name: String,
    /// Contract address.
    pub address: Address,
    /// Events in earlier blocks are ignored.
    #[serde(default)]
    pub start_block: u64,
}

/// A handler group instantiated at runtime for addresses discovered from events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSource {
    pub name: String,
}

/// Which contracts feed which handler groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub data_sources: Vec<DataSource>,
    #[serde(default)]
    pub templates: Vec<TemplateSource>,
}

impl Manifest {
    /// Add a static data source.
    pub fn data_source(mut self, name: impl Into<String>, address: Address, start_block: u64) -> Self {
        self.data_sources.push(DataSource {
            name: name.into(),
            address,
            start_block,
        });
        self
    }

    /// Add a template.
    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.templates.push(TemplateSource { name: name.into() });
        self
    }

    /// The static data source that accepts `event`, if any.
    pub fn static_source(&self, event: &DecodedEvent) -> Option<&DataSource> {
        self.data_sources
            .iter()
            .find(|s| s.address == event.address && event.block_number >= s.start_block)
    }

    /// Returns `true` if a template named `name` is declared.
    pub fn has_template(&self, name: &str) -> bool {
        self.templates.iter().any(|t| t.name == name)
    }

    /// Reject duplicate names and duplicate static addresses.
    pub fn validate(&self) -> Result<(), MappingError> {
        let mut names = std::collections::HashSet::new();
        for name in self
            .data_sources
            .iter()
            .map(|s| &s.name)
            .chain(self.templates.iter().map(|t| &t.name))
        {
            if !names.insert(name.as_str()) {
                return Err(MappingError::Config(format!("duplicate source name '{name}'")));
            }
        }
        let mut addresses = std::collections::HashSet::new();
        for s in &self.data_sources {
            if !addresses.insert(s.address) {
                return Err(MappingError::Config(format!(
                    "address {} declared by more than one data source",
                    s.address
                )));
            }
        }
        Ok(())
    }
}

/// Configuration for an indexer instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Unique name for this indexer.
    #[serde(default = "default_id")]
    pub id: String,
    /// Chain slug (e.g. `"mainnet"`).
    #[serde(default = "default_chain")]
    pub chain: String,
    /// Capacity of the pipeline's event queue.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Data sources and templates.
    #[serde(flatten)]
    pub manifest: Manifest,
}

fn default_id() -> String { "default".into() }
fn default_chain() -> String { "mainnet".into() }
fn default_channel_capacity() -> usize { 1_024 }

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            id: default_id(),
            chain: default_chain(),
            channel_capacity: default_channel_capacity(),
            manifest: Manifest::default(),
        }
    }
}

impl IndexerConfig {
    /// Parse and validate a YAML config.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, MappingError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| MappingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| MappingError::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), MappingError> {
        if self.channel_capacity == 0 {
            return Err(MappingError::Config("channel_capacity must be > 0".into()));
        }
        self.manifest.validate()
    }
}
