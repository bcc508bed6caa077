//! Shared types for the mapping runtime.

use alloy_primitives::{Address, U256};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::MappingError;

// ─── BlockSummary ─────────────────────────────────────────────────────────────

/// The block an event was emitted in, as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    /// Block number.
    pub number: u64,
    /// Block hash (`0x…`).
    #[serde(default)]
    pub hash: String,
    /// Unix timestamp of the block (seconds since epoch).
    pub timestamp: u64,
}

// ─── DecodedEvent ─────────────────────────────────────────────────────────────

/// A decoded contract event.
///
/// The host decodes raw logs against the contract ABI; `params` carries the
/// named event parameters as JSON so each mapping can deserialize its own
/// strongly-typed view with [`DecodedEvent::params`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedEvent {
    /// The event name (e.g. `"NewProject"`).
    pub schema: String,
    /// Contract address that emitted the event.
    pub address: Address,
    /// Transaction hash.
    #[serde(default)]
    pub tx_hash: String,
    /// Block number.
    pub block_number: u64,
    /// Log index within the block.
    #[serde(default)]
    pub log_index: u32,
    /// Named event parameters.
    pub params: serde_json::Value,
}

impl DecodedEvent {
    /// Build an event from typed params.
    pub fn new<P: Serialize>(
        schema: impl Into<String>,
        address: Address,
        block_number: u64,
        params: &P,
    ) -> Result<Self, MappingError> {
        let schema = schema.into();
        let params = serde_json::to_value(params).map_err(|e| MappingError::Decode {
            schema: schema.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            schema,
            address,
            tx_hash: String::new(),
            block_number,
            log_index: 0,
            params,
        })
    }

    /// Deserialize the event params into `P`.
    pub fn params<P: DeserializeOwned>(&self) -> Result<P, MappingError> {
        P::deserialize(&self.params).map_err(|e| MappingError::Decode {
            schema: self.schema.clone(),
            reason: e.to_string(),
        })
    }
}

/// One line of a replay file: an event together with its block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub block: BlockSummary,
    pub event: DecodedEvent,
}

// ─── Id helpers ───────────────────────────────────────────────────────────────

/// Lowercase `0x`-prefixed hex of an address.
pub fn address_hex(address: &Address) -> String {
    format!("{address:#x}")
}

/// Minimal lowercase `0x`-prefixed hex of an unsigned integer (`0x0` for zero).
pub fn uint_hex(value: &U256) -> String {
    format!("{value:#x}")
}

// ─── Tests ────────────────────────────────────────────────────────────────────
