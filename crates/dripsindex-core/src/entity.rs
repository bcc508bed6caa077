//! Entity definitions and id derivation.
//!
//! Ids are deterministic strings built from addresses and integers so that
//! repeated events about the same logical object resolve to the same record.

use alloy_primitives::{Address, U256};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{address_hex, uint_hex};

/// A record persisted in the entity store.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Entity type name used as the store's table/namespace.
    const ENTITY_TYPE: &'static str;

    /// The record's id within its entity type.
    fn id(&self) -> &str;
}

/// Every entity type the mappings write.
pub const ENTITY_TYPES: [&str; 7] = [
    FundingProject::ENTITY_TYPE,
    DripsConfig::ENTITY_TYPE,
    DripsEntry::ENTITY_TYPE,
    SplitsConfig::ENTITY_TYPE,
    SplitsEntry::ENTITY_TYPE,
    TokenType::ENTITY_TYPE,
    Token::ENTITY_TYPE,
];

// ─── Ids ──────────────────────────────────────────────────────────────────────

/// `DripsEntry` id: `user-receiver`, or `user-receiver-account` for account drips.
pub fn drips_entry_id(user: &Address, receiver: &Address, account: Option<&U256>) -> String {
    match account {
        Some(account) => format!(
            "{}-{}-{}",
            address_hex(user),
            address_hex(receiver),
            uint_hex(account)
        ),
        None => format!("{}-{}", address_hex(user), address_hex(receiver)),
    }
}

/// `SplitsEntry` id: `user-receiver`.
pub fn splits_entry_id(user: &Address, receiver: &Address) -> String {
    format!("{}-{}", address_hex(user), address_hex(receiver))
}

/// `TokenType` id: `registry-typeId` with the type id in decimal.
pub fn token_type_id(registry: &Address, type_id: &U256) -> String {
    format!("{}-{}", address_hex(registry), type_id)
}

/// `Token` id: hex token id immediately followed by the registry address.
pub fn token_id(token_id: &U256, registry: &Address) -> String {
    format!("{}{}", uint_hex(token_id), address_hex(registry))
}

// ─── FundingProject ───────────────────────────────────────────────────────────

/// A crowdfunded token contract and its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingProject {
    pub id: String,
    pub project_name: String,
    pub project_owner: Address,
    pub drips_token_template: Address,
    pub block_timestamp_created: Option<U256>,
    pub dai_collected: U256,
    pub dai_split: U256,
    pub ipfs_hash: Option<String>,
}

impl FundingProject {
    /// A project with zeroed totals and no metadata.
    pub fn new(
        funding_token: &Address,
        project_name: impl Into<String>,
        project_owner: Address,
        drips_token_template: Address,
    ) -> Self {
        Self {
            id: address_hex(funding_token),
            project_name: project_name.into(),
            project_owner,
            drips_token_template,
            block_timestamp_created: None,
            dai_collected: U256::ZERO,
            dai_split: U256::ZERO,
            ipfs_hash: None,
        }
    }
}

impl Entity for FundingProject {
    const ENTITY_TYPE: &'static str = "FundingProject";
    fn id(&self) -> &str {
        &self.id
    }
}

// ─── Drips ────────────────────────────────────────────────────────────────────

/// Per-user streaming configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DripsConfig {
    pub id: String,
    pub balance: U256,
}

impl DripsConfig {
    pub fn new(user: &Address, balance: U256) -> Self {
        Self {
            id: address_hex(user),
            balance,
        }
    }
}

impl Entity for DripsConfig {
    const ENTITY_TYPE: &'static str = "DripsConfig";
    fn id(&self) -> &str {
        &self.id
    }
}

/// One streaming relationship from a sender (optionally one of its accounts)
/// to a receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DripsEntry {
    pub id: String,
    pub user: Address,
    /// Id of the owning `DripsConfig`.
    pub drips_config: String,
    pub receiver: Address,
    pub account: Option<U256>,
    pub is_account_drip: bool,
    pub amt_per_sec: U256,
    pub end_time: U256,
}

impl Entity for DripsEntry {
    const ENTITY_TYPE: &'static str = "DripsEntry";
    fn id(&self) -> &str {
        &self.id
    }
}

// ─── Splits ───────────────────────────────────────────────────────────────────

/// Per-user splits configuration: the receivers of the latest update, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitsConfig {
    pub id: String,
    pub receiver_addresses: Vec<Address>,
}

impl SplitsConfig {
    pub fn new(user: &Address) -> Self {
        Self {
            id: address_hex(user),
            receiver_addresses: Vec::new(),
        }
    }
}

impl Entity for SplitsConfig {
    const ENTITY_TYPE: &'static str = "SplitsConfig";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A weighted revenue share from `sender` to `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitsEntry {
    pub id: String,
    pub sender: Address,
    pub receiver: Address,
    /// Back-reference id. Holds the receiver's hex address, see DESIGN.md.
    pub splits_config: String,
    pub weight: u32,
}

impl Entity for SplitsEntry {
    const ENTITY_TYPE: &'static str = "SplitsEntry";
    fn id(&self) -> &str {
        &self.id
    }
}

// ─── Tokens ───────────────────────────────────────────────────────────────────

/// A class of NFTs mintable under a funding project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenType {
    pub id: String,
    pub token_registry_address: Address,
    pub token_type_id: U256,
    pub limit: U256,
    pub min_amt_per_sec: U256,
    pub streaming: bool,
    /// Id of the owning `FundingProject`.
    pub funding_project: String,
    pub ipfs_hash: String,
}

impl Entity for TokenType {
    const ENTITY_TYPE: &'static str = "TokenType";
    fn id(&self) -> &str {
        &self.id
    }
}

/// A minted NFT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub token_id: U256,
    pub token_registry_address: Address,
    /// Id of the `TokenType`.
    pub token_type: String,
    pub token_receiver: Address,
    pub amt_per_sec: Option<U256>,
    /// Id of the owning `FundingProject`.
    pub funding_project: String,
}

impl Entity for Token {
    const ENTITY_TYPE: &'static str = "Token";
    fn id(&self) -> &str {
        &self.id
    }
}
