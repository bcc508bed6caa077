//! Drips token handlers.
//!
//! Every token contract is a `DripsToken` template instance created by
//! `NewProject`, so the emitting address is both the token registry and the
//! owning project's id.

use async_trait::async_trait;

use dripsindex_core::entity::{token_id, token_type_id, FundingProject, Token, TokenType};
use dripsindex_core::types::address_hex;
use dripsindex_core::{DecodedEvent, EventMapping, MappingContext, MappingError};

use crate::events;
use crate::DRIPS_TOKEN;

pub struct NewTypeHandler;

#[async_trait]
impl EventMapping for NewTypeHandler {
    type Params = events::NewType;
    const SCHEMA: &'static str = "NewType";
    const DATA_SOURCE: &'static str = DRIPS_TOKEN;

    async fn map(
        &self,
        ev: events::NewType,
        event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        let token_type = TokenType {
            id: token_type_id(&event.address, &ev.nft_type),
            token_registry_address: event.address,
            token_type_id: ev.nft_type,
            limit: ev.limit,
            min_amt_per_sec: ev.min_amt,
            streaming: ev.streaming,
            funding_project: address_hex(&event.address),
            ipfs_hash: ev.ipfs_hash,
        };
        ctx.save(&token_type).await
    }
}

pub struct NewStreamingTokenHandler;

#[async_trait]
impl EventMapping for NewStreamingTokenHandler {
    type Params = events::NewStreamingToken;
    const SCHEMA: &'static str = "NewStreamingToken";
    const DATA_SOURCE: &'static str = DRIPS_TOKEN;

    async fn map(
        &self,
        ev: events::NewStreamingToken,
        event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        let token = Token {
            id: token_id(&ev.token_id, &event.address),
            token_id: ev.token_id,
            token_registry_address: event.address,
            token_type: token_type_id(&event.address, &ev.type_id),
            token_receiver: ev.receiver,
            amt_per_sec: Some(ev.amt_per_sec),
            funding_project: address_hex(&event.address),
        };
        ctx.save(&token).await
    }
}

pub struct NewTokenHandler;

#[async_trait]
impl EventMapping for NewTokenHandler {
    type Params = events::NewToken;
    const SCHEMA: &'static str = "NewToken";
    const DATA_SOURCE: &'static str = DRIPS_TOKEN;

    async fn map(
        &self,
        ev: events::NewToken,
        event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        let token = Token {
            id: token_id(&ev.token_id, &event.address),
            token_id: ev.token_id,
            token_registry_address: event.address,
            token_type: token_type_id(&event.address, &ev.type_id),
            token_receiver: ev.receiver,
            amt_per_sec: None,
            funding_project: address_hex(&event.address),
        };
        ctx.save(&token).await
    }
}

/// Moves an existing token to its new receiver.
pub struct TransferHandler;

#[async_trait]
impl EventMapping for TransferHandler {
    type Params = events::Transfer;
    const SCHEMA: &'static str = "Transfer";
    const DATA_SOURCE: &'static str = DRIPS_TOKEN;

    async fn map(
        &self,
        ev: events::Transfer,
        event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        let id = token_id(&ev.token_id, &event.address);
        let Some(mut token) = ctx.load::<Token>(&id).await? else {
            tracing::debug!(token = %id, "Transfer of unknown token, skipping");
            return Ok(());
        };

        token.token_receiver = ev.to;
        ctx.save(&token).await
    }
}

/// Records the project's metadata URI.
pub struct NewContractUriHandler;

#[async_trait]
impl EventMapping for NewContractUriHandler {
    type Params = events::NewContractURI;
    const SCHEMA: &'static str = "NewContractURI";
    const DATA_SOURCE: &'static str = DRIPS_TOKEN;

    async fn map(
        &self,
        ev: events::NewContractURI,
        event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        let id = address_hex(&event.address);
        let Some(mut project) = ctx.load::<FundingProject>(&id).await? else {
            tracing::debug!(project = %id, "Contract URI for unknown project, skipping");
            return Ok(());
        };

        project.ipfs_hash = Some(ev.contract_uri);
        ctx.save(&project).await
    }
}
