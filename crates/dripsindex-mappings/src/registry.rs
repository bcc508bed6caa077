//! Registry and drips hub handlers.
//!
//! `NewProject` comes from the `RadicleRegistry` contract; everything else
//! from `DaiDripsHub`.

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use dripsindex_core::entity::{
    drips_entry_id, splits_entry_id, DripsConfig, DripsEntry, FundingProject, SplitsConfig,
    SplitsEntry,
};
use dripsindex_core::types::address_hex;
use dripsindex_core::{DecodedEvent, EventMapping, MappingContext, MappingError};

use crate::events;
use crate::{DAI_DRIPS_HUB, DRIPS_TOKEN, RADICLE_REGISTRY};

/// Creates the project and starts tracking its token contract.
pub struct NewProjectHandler;

#[async_trait]
impl EventMapping for NewProjectHandler {
    type Params = events::NewProject;
    const SCHEMA: &'static str = "NewProject";
    const DATA_SOURCE: &'static str = RADICLE_REGISTRY;

    async fn map(
        &self,
        ev: events::NewProject,
        _event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        let mut project = FundingProject::new(
            &ev.funding_token,
            ev.name,
            ev.project_owner,
            ev.drip_token_template,
        );
        project.block_timestamp_created = Some(U256::from(ctx.block.timestamp));
        ctx.save(&project).await?;

        ctx.create_template(DRIPS_TOKEN, ev.funding_token).await
    }
}

/// Accumulates collected and split amounts on the user's project.
pub struct CollectedHandler;

#[async_trait]
impl EventMapping for CollectedHandler {
    type Params = events::Collected;
    const SCHEMA: &'static str = "Collected";
    const DATA_SOURCE: &'static str = DAI_DRIPS_HUB;

    async fn map(
        &self,
        ev: events::Collected,
        _event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        let id = address_hex(&ev.user);
        let Some(mut project) = ctx.load::<FundingProject>(&id).await? else {
            tracing::debug!(project = %id, "Collected for unknown project, skipping");
            return Ok(());
        };

        project.dai_collected = project.dai_collected.saturating_add(ev.collected);
        project.dai_split = project.dai_split.saturating_add(ev.split);
        ctx.save(&project).await
    }
}

/// Creates an empty `DripsConfig` for `user` unless one exists.
async fn ensure_drips_config(ctx: &MappingContext, user: &Address) -> Result<(), MappingError> {
    let id = address_hex(user);
    if ctx.load::<DripsConfig>(&id).await?.is_none() {
        ctx.save(&DripsConfig::new(user, U256::ZERO)).await?;
    }
    Ok(())
}

async fn upsert_drip(
    ctx: &MappingContext,
    user: Address,
    receiver: Address,
    account: Option<U256>,
    amt_per_sec: U256,
    end_time: U256,
) -> Result<(), MappingError> {
    ensure_drips_config(ctx, &user).await?;

    let id = drips_entry_id(&user, &receiver, account.as_ref());
    // Upsert: every field of an existing entry is overwritten.
    let entry = DripsEntry {
        id,
        user,
        drips_config: address_hex(&user),
        receiver,
        account,
        is_account_drip: account.is_some(),
        amt_per_sec,
        end_time,
    };
    ctx.save(&entry).await
}

pub struct DrippingHandler;

#[async_trait]
impl EventMapping for DrippingHandler {
    type Params = events::Dripping;
    const SCHEMA: &'static str = "Dripping";
    const DATA_SOURCE: &'static str = DAI_DRIPS_HUB;

    async fn map(
        &self,
        ev: events::Dripping,
        _event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        upsert_drip(ctx, ev.user, ev.receiver, None, ev.amt_per_sec, ev.end_time).await
    }
}

pub struct DrippingWithAccountHandler;

#[async_trait]
impl EventMapping for DrippingWithAccountHandler {
    type Params = events::DrippingWithAccount;
    const SCHEMA: &'static str = "DrippingWithAccount";
    const DATA_SOURCE: &'static str = DAI_DRIPS_HUB;

    async fn map(
        &self,
        ev: events::DrippingWithAccount,
        _event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        upsert_drip(
            ctx,
            ev.user,
            ev.receiver,
            Some(ev.account),
            ev.amt_per_sec,
            ev.end_time,
        )
        .await
    }
}

/// Replaces the user's splits wholesale.
///
/// Every entry listed by the existing config is removed before the new
/// receivers are written, so no entry from an earlier update survives.
pub struct SplitsUpdatedHandler;

#[async_trait]
impl EventMapping for SplitsUpdatedHandler {
    type Params = events::SplitsUpdated;
    const SCHEMA: &'static str = "SplitsUpdated";
    const DATA_SOURCE: &'static str = DAI_DRIPS_HUB;

    async fn map(
        &self,
        ev: events::SplitsUpdated,
        _event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        let id = address_hex(&ev.user);
        let mut config = match ctx.load::<SplitsConfig>(&id).await? {
            Some(mut config) => {
                for receiver in &config.receiver_addresses {
                    ctx.remove::<SplitsEntry>(&splits_entry_id(&ev.user, receiver))
                        .await?;
                }
                config.receiver_addresses.clear();
                config
            }
            None => SplitsConfig::new(&ev.user),
        };

        for split in &ev.receivers {
            let entry = SplitsEntry {
                id: splits_entry_id(&ev.user, &split.receiver),
                sender: ev.user,
                receiver: split.receiver,
                splits_config: address_hex(&split.receiver),
                weight: split.weight,
            };
            ctx.save(&entry).await?;
            config.receiver_addresses.push(split.receiver);
        }

        tracing::debug!(user = %id, receivers = ev.receivers.len(), "Splits rebuilt");
        ctx.save(&config).await
    }
}

async fn set_balance(
    ctx: &MappingContext,
    user: &Address,
    balance: U256,
) -> Result<(), MappingError> {
    let id = address_hex(user);
    let mut config = ctx
        .load::<DripsConfig>(&id)
        .await?
        .unwrap_or_else(|| DripsConfig::new(user, balance));
    config.balance = balance;
    ctx.save(&config).await
}

pub struct DripsUpdatedHandler;

#[async_trait]
impl EventMapping for DripsUpdatedHandler {
    type Params = events::DripsUpdated;
    const SCHEMA: &'static str = "DripsUpdated";
    const DATA_SOURCE: &'static str = DAI_DRIPS_HUB;

    async fn map(
        &self,
        ev: events::DripsUpdated,
        _event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        set_balance(ctx, &ev.user, ev.balance).await
    }
}

/// Balance is tracked per user, so the account is not part of the key.
pub struct DripsUpdatedWithAccountHandler;

#[async_trait]
impl EventMapping for DripsUpdatedWithAccountHandler {
    type Params = events::DripsUpdatedWithAccount;
    const SCHEMA: &'static str = "DripsUpdatedWithAccount";
    const DATA_SOURCE: &'static str = DAI_DRIPS_HUB;

    async fn map(
        &self,
        ev: events::DripsUpdatedWithAccount,
        _event: &DecodedEvent,
        ctx: &MappingContext,
    ) -> Result<(), MappingError> {
        set_balance(ctx, &ev.user, ev.balance).await
    }
}
