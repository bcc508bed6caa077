//! Typed params of the events the mappings consume.
//!
//! Field names follow the contract ABIs, so the decoded JSON params
//! deserialize directly. Extra params (e.g. the receiver list of
//! `DripsUpdated`) are ignored.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

// ─── RadicleRegistry ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub funding_token: Address,
    pub project_owner: Address,
    pub drip_token_template: Address,
    pub name: String,
}

// ─── DaiDripsHub ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collected {
    pub user: Address,
    pub collected: U256,
    pub split: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dripping {
    pub user: Address,
    pub receiver: Address,
    pub amt_per_sec: U256,
    pub end_time: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrippingWithAccount {
    pub user: Address,
    pub account: U256,
    pub receiver: Address,
    pub amt_per_sec: U256,
    pub end_time: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitsReceiver {
    pub receiver: Address,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitsUpdated {
    pub user: Address,
    pub receivers: Vec<SplitsReceiver>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripsUpdated {
    pub user: Address,
    pub balance: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DripsUpdatedWithAccount {
    pub user: Address,
    pub account: U256,
    pub balance: U256,
}

// ─── DripsToken ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewType {
    pub nft_type: U256,
    pub limit: U256,
    pub min_amt: U256,
    pub streaming: bool,
    pub ipfs_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStreamingToken {
    pub receiver: Address,
    pub type_id: U256,
    pub token_id: U256,
    pub amt_per_sec: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewToken {
    pub token_id: U256,
    pub receiver: Address,
    pub type_id: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub token_id: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContractURI {
    #[serde(rename = "contractURI")]
    pub contract_uri: String,
}
