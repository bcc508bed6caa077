//! End-to-end mapping tests: events go through the runtime into an in-memory store.

use std::sync::Arc;

use alloy_primitives::{address, Address, U256};
use serde::Serialize;

use dripsindex_core::entity::{
    drips_entry_id, splits_entry_id, token_id, token_type_id, DripsConfig, DripsEntry,
    FundingProject, SplitsConfig, SplitsEntry, Token, TokenType,
};
use dripsindex_core::types::address_hex;
use dripsindex_core::{
    BlockSummary, DecodedEvent, EventPipeline, EventRecord, HandlerRegistry, Manifest,
    MappingError, MappingRuntime, Outcome, SkipReason, TemplateRegistry,
};
use dripsindex_mappings::events::*;
use dripsindex_mappings::{manifest, register_all, DRIPS_TOKEN, RADICLE_REGISTRY};
use dripsindex_storage::InMemoryStorage;

const REGISTRY: Address = address!("4a7dbc6e1b5c1a8c3fb2c1a1f7a1b0c4d3e2f100");
const HUB: Address = address!("73043143e0a6418cc45d82d4505b096b802fd365");
const PROJECT: Address = address!("1111111111111111111111111111111111111111");
const OWNER: Address = address!("2222222222222222222222222222222222222222");
const TEMPLATE: Address = address!("3333333333333333333333333333333333333333");
const ALICE: Address = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
const BOB: Address = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
const CAROL: Address = address!("cccccccccccccccccccccccccccccccccccccccc");

struct Harness {
    storage: Arc<InMemoryStorage>,
    runtime: MappingRuntime,
    block: u64,
}

impl Harness {
    fn new() -> Self {
        let storage = Arc::new(InMemoryStorage::new());
        let mut handlers = HandlerRegistry::new();
        register_all(&mut handlers);
        let runtime = MappingRuntime::new(
            manifest(REGISTRY, HUB, 0),
            handlers,
            storage.clone(),
            storage.clone(),
        );
        Self {
            storage,
            runtime,
            block: 100,
        }
    }

    async fn emit<P: Serialize>(&mut self, schema: &str, address: Address, params: P) -> Outcome {
        self.block += 1;
        let event = DecodedEvent::new(schema, address, self.block, &params).unwrap();
        let block = BlockSummary {
            number: self.block,
            hash: format!("0x{:064x}", self.block),
            timestamp: 1_600_000_000 + self.block * 12,
        };
        self.runtime.process(&event, &block).await.unwrap()
    }

    async fn new_project(&mut self) {
        self.emit(
            "NewProject",
            REGISTRY,
            NewProject {
                funding_token: PROJECT,
                project_owner: OWNER,
                drip_token_template: TEMPLATE,
                name: "radicle".into(),
            },
        )
        .await;
    }

    async fn collected(&mut self, user: Address, collected: u64, split: u64) {
        self.emit(
            "Collected",
            HUB,
            Collected {
                user,
                collected: U256::from(collected),
                split: U256::from(split),
            },
        )
        .await;
    }

    async fn splits(&mut self, user: Address, receivers: &[(Address, u32)]) {
        let receivers = receivers
            .iter()
            .map(|(receiver, weight)| SplitsReceiver {
                receiver: *receiver,
                weight: *weight,
            })
            .collect();
        self.emit("SplitsUpdated", HUB, SplitsUpdated { user, receivers })
            .await;
    }

    fn project(&self) -> FundingProject {
        self.storage.get(&address_hex(&PROJECT)).unwrap()
    }

    fn splits_of(&self, user: &Address) -> Vec<SplitsEntry> {
        self.storage
            .all::<SplitsEntry>()
            .into_iter()
            .filter(|e| e.sender == *user)
            .collect()
    }
}

// ─── Registry ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_project_creates_project_and_tracks_token() {
    let mut h = Harness::new();
    h.new_project().await;

    let p = h.project();
    assert_eq!(p.project_name, "radicle");
    assert_eq!(p.project_owner, OWNER);
    assert_eq!(p.drips_token_template, TEMPLATE);
    assert_eq!(p.dai_collected, U256::ZERO);
    assert_eq!(p.dai_split, U256::ZERO);
    assert_eq!(p.block_timestamp_created, Some(U256::from(1_600_000_000u64 + 101 * 12)));
    assert!(p.ipfs_hash.is_none());

    assert_eq!(h.storage.instances(DRIPS_TOKEN).await.unwrap(), vec![PROJECT]);
}

#[tokio::test]
async fn collected_accumulates() {
    let mut h = Harness::new();
    h.new_project().await;

    h.collected(PROJECT, 100, 20).await;
    let p = h.project();
    assert_eq!(p.dai_collected, U256::from(100u64));
    assert_eq!(p.dai_split, U256::from(20u64));

    h.collected(PROJECT, 50, 5).await;
    let p = h.project();
    assert_eq!(p.dai_collected, U256::from(150u64));
    assert_eq!(p.dai_split, U256::from(25u64));
}

#[tokio::test]
async fn collected_without_project_is_noop() {
    let mut h = Harness::new();
    h.collected(ALICE, 100, 20).await;
    assert_eq!(h.storage.total(), 0);
}

#[tokio::test]
async fn dripping_overwrites_latest_values() {
    let mut h = Harness::new();
    for (rate, end) in [(10u64, 1_000u64), (25, 2_000), (7, 500)] {
        h.emit(
            "Dripping",
            HUB,
            Dripping {
                user: ALICE,
                receiver: BOB,
                amt_per_sec: U256::from(rate),
                end_time: U256::from(end),
            },
        )
        .await;
    }

    assert_eq!(h.storage.len_of("DripsEntry"), 1);
    let entry: DripsEntry = h.storage.get(&drips_entry_id(&ALICE, &BOB, None)).unwrap();
    assert_eq!(entry.amt_per_sec, U256::from(7u64));
    assert_eq!(entry.end_time, U256::from(500u64));
    assert!(!entry.is_account_drip);
    assert!(entry.account.is_none());
    assert_eq!(entry.drips_config, address_hex(&ALICE));

    let cfg: DripsConfig = h.storage.get(&address_hex(&ALICE)).unwrap();
    assert_eq!(cfg.balance, U256::ZERO);
}

#[tokio::test]
async fn account_and_plain_drips_do_not_collide() {
    let mut h = Harness::new();
    h.emit(
        "Dripping",
        HUB,
        Dripping {
            user: ALICE,
            receiver: BOB,
            amt_per_sec: U256::from(1u64),
            end_time: U256::from(10u64),
        },
    )
    .await;
    h.emit(
        "DrippingWithAccount",
        HUB,
        DrippingWithAccount {
            user: ALICE,
            account: U256::from(3u64),
            receiver: BOB,
            amt_per_sec: U256::from(2u64),
            end_time: U256::from(20u64),
        },
    )
    .await;

    assert_eq!(h.storage.len_of("DripsEntry"), 2);

    let plain: DripsEntry = h.storage.get(&drips_entry_id(&ALICE, &BOB, None)).unwrap();
    assert_eq!(plain.amt_per_sec, U256::from(1u64));
    assert!(!plain.is_account_drip);

    let account_id = drips_entry_id(&ALICE, &BOB, Some(&U256::from(3u64)));
    assert!(account_id.ends_with("-0x3"));
    let account: DripsEntry = h.storage.get(&account_id).unwrap();
    assert_eq!(account.amt_per_sec, U256::from(2u64));
    assert!(account.is_account_drip);
    assert_eq!(account.account, Some(U256::from(3u64)));

    // One config for the sender
    assert_eq!(h.storage.len_of("DripsConfig"), 1);
}

#[tokio::test]
async fn account_dripping_overwrites_latest_values() {
    let mut h = Harness::new();
    let account = U256::from(3u64);
    for (rate, end) in [(4u64, 100u64), (9, 900), (6, 600)] {
        h.emit(
            "DrippingWithAccount",
            HUB,
            DrippingWithAccount {
                user: ALICE,
                account,
                receiver: BOB,
                amt_per_sec: U256::from(rate),
                end_time: U256::from(end),
            },
        )
        .await;
    }

    assert_eq!(h.storage.len_of("DripsEntry"), 1);
    let entry: DripsEntry = h
        .storage
        .get(&drips_entry_id(&ALICE, &BOB, Some(&account)))
        .unwrap();
    assert_eq!(entry.amt_per_sec, U256::from(6u64));
    assert_eq!(entry.end_time, U256::from(600u64));
    assert!(entry.is_account_drip);
    assert_eq!(entry.account, Some(account));
}

#[tokio::test]
async fn dripping_keeps_existing_balance() {
    let mut h = Harness::new();
    h.emit("DripsUpdated", HUB, DripsUpdated { user: ALICE, balance: U256::from(500u64) })
        .await;
    h.emit(
        "Dripping",
        HUB,
        Dripping {
            user: ALICE,
            receiver: BOB,
            amt_per_sec: U256::from(1u64),
            end_time: U256::from(10u64),
        },
    )
    .await;

    let cfg: DripsConfig = h.storage.get(&address_hex(&ALICE)).unwrap();
    assert_eq!(cfg.balance, U256::from(500u64));
}

#[tokio::test]
async fn drips_updated_variants_set_balance() {
    let mut h = Harness::new();
    h.emit("DripsUpdated", HUB, DripsUpdated { user: ALICE, balance: U256::from(5u64) })
        .await;
    let cfg: DripsConfig = h.storage.get(&address_hex(&ALICE)).unwrap();
    assert_eq!(cfg.balance, U256::from(5u64));

    h.emit(
        "DripsUpdatedWithAccount",
        HUB,
        DripsUpdatedWithAccount {
            user: ALICE,
            account: U256::from(9u64),
            balance: U256::from(42u64),
        },
    )
    .await;
    assert_eq!(h.storage.len_of("DripsConfig"), 1);
    let cfg: DripsConfig = h.storage.get(&address_hex(&ALICE)).unwrap();
    assert_eq!(cfg.balance, U256::from(42u64));
}

#[tokio::test]
async fn splits_updated_rebuilds_from_scratch() {
    let mut h = Harness::new();
    h.splits(ALICE, &[(BOB, 100), (CAROL, 200)]).await;

    let cfg: SplitsConfig = h.storage.get(&address_hex(&ALICE)).unwrap();
    assert_eq!(cfg.receiver_addresses, vec![BOB, CAROL]);
    assert_eq!(h.splits_of(&ALICE).len(), 2);

    h.splits(ALICE, &[(CAROL, 50)]).await;

    let cfg: SplitsConfig = h.storage.get(&address_hex(&ALICE)).unwrap();
    assert_eq!(cfg.receiver_addresses, vec![CAROL]);
    let entries = h.splits_of(&ALICE);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].receiver, CAROL);
    assert_eq!(entries[0].weight, 50);
    assert!(h
        .storage
        .get::<SplitsEntry>(&splits_entry_id(&ALICE, &BOB))
        .is_none());

    h.splits(ALICE, &[]).await;
    let cfg: SplitsConfig = h.storage.get(&address_hex(&ALICE)).unwrap();
    assert!(cfg.receiver_addresses.is_empty());
    assert!(h.splits_of(&ALICE).is_empty());
}

#[tokio::test]
async fn splits_of_other_users_untouched() {
    let mut h = Harness::new();
    h.splits(ALICE, &[(CAROL, 1)]).await;
    h.splits(BOB, &[(CAROL, 2)]).await;
    h.splits(ALICE, &[]).await;

    let bob = h.splits_of(&BOB);
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].weight, 2);
}

#[tokio::test]
async fn splits_entry_back_reference_is_receiver() {
    let mut h = Harness::new();
    h.splits(ALICE, &[(BOB, 10)]).await;
    let entry: SplitsEntry = h.storage.get(&splits_entry_id(&ALICE, &BOB)).unwrap();
    assert_eq!(entry.sender, ALICE);
    assert_eq!(entry.splits_config, address_hex(&BOB));
}

// ─── Tokens ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn token_events_before_project_are_skipped() {
    let mut h = Harness::new();
    let outcome = h
        .emit(
            "NewToken",
            PROJECT,
            NewToken { token_id: U256::from(1u64), receiver: BOB, type_id: U256::ZERO },
        )
        .await;
    assert_eq!(outcome, Outcome::Skipped(SkipReason::UnknownAddress));
    assert_eq!(h.storage.total(), 0);
}

#[tokio::test]
async fn new_project_without_token_template_fails() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut handlers = HandlerRegistry::new();
    register_all(&mut handlers);
    let runtime = MappingRuntime::new(
        Manifest::default().data_source(RADICLE_REGISTRY, REGISTRY, 0),
        handlers,
        storage.clone(),
        storage.clone(),
    );

    let event = DecodedEvent::new(
        "NewProject",
        REGISTRY,
        1,
        &NewProject {
            funding_token: PROJECT,
            project_owner: OWNER,
            drip_token_template: TEMPLATE,
            name: "radicle".into(),
        },
    )
    .unwrap();
    let block = BlockSummary { number: 1, hash: String::new(), timestamp: 0 };
    let err = runtime.process(&event, &block).await.unwrap_err();

    assert!(matches!(err, MappingError::Template(_)));
    assert!(storage.instances(DRIPS_TOKEN).await.unwrap().is_empty());
}

#[tokio::test]
async fn new_type_and_tokens() {
    let mut h = Harness::new();
    h.new_project().await;

    h.emit(
        "NewType",
        PROJECT,
        NewType {
            nft_type: U256::from(2u64),
            limit: U256::from(100u64),
            min_amt: U256::from(10u64),
            streaming: true,
            ipfs_hash: "Qmtype".into(),
        },
    )
    .await;
    let tt: TokenType = h
        .storage
        .get(&token_type_id(&PROJECT, &U256::from(2u64)))
        .unwrap();
    assert_eq!(tt.id, format!("{}-2", address_hex(&PROJECT)));
    assert_eq!(tt.limit, U256::from(100u64));
    assert_eq!(tt.min_amt_per_sec, U256::from(10u64));
    assert!(tt.streaming);
    assert_eq!(tt.funding_project, address_hex(&PROJECT));
    assert_eq!(tt.ipfs_hash, "Qmtype");

    h.emit(
        "NewStreamingToken",
        PROJECT,
        NewStreamingToken {
            receiver: ALICE,
            type_id: U256::from(2u64),
            token_id: U256::from(0x200000001u64),
            amt_per_sec: U256::from(15u64),
        },
    )
    .await;
    h.emit(
        "NewToken",
        PROJECT,
        NewToken { token_id: U256::from(5u64), receiver: BOB, type_id: U256::from(2u64) },
    )
    .await;

    let streaming: Token = h
        .storage
        .get(&token_id(&U256::from(0x200000001u64), &PROJECT))
        .unwrap();
    assert_eq!(streaming.id, format!("0x200000001{}", address_hex(&PROJECT)));
    assert_eq!(streaming.token_type, tt.id);
    assert_eq!(streaming.token_receiver, ALICE);
    assert_eq!(streaming.amt_per_sec, Some(U256::from(15u64)));

    let plain: Token = h.storage.get(&token_id(&U256::from(5u64), &PROJECT)).unwrap();
    assert_eq!(plain.token_receiver, BOB);
    assert!(plain.amt_per_sec.is_none());
    assert_eq!(plain.funding_project, address_hex(&PROJECT));
}

#[tokio::test]
async fn transfer_updates_receiver() {
    let mut h = Harness::new();
    h.new_project().await;
    h.emit(
        "NewToken",
        PROJECT,
        NewToken { token_id: U256::from(1u64), receiver: ALICE, type_id: U256::ZERO },
    )
    .await;
    h.emit(
        "Transfer",
        PROJECT,
        Transfer { from: ALICE, to: CAROL, token_id: U256::from(1u64) },
    )
    .await;

    let token: Token = h.storage.get(&token_id(&U256::from(1u64), &PROJECT)).unwrap();
    assert_eq!(token.token_receiver, CAROL);
}

#[tokio::test]
async fn transfer_of_missing_token_is_noop() {
    let mut h = Harness::new();
    h.new_project().await;
    let before = h.storage.total();

    let outcome = h
        .emit(
            "Transfer",
            PROJECT,
            Transfer { from: Address::ZERO, to: CAROL, token_id: U256::from(77u64) },
        )
        .await;
    assert!(matches!(outcome, Outcome::Handled { .. }));
    assert_eq!(h.storage.total(), before);
    assert_eq!(h.storage.len_of("Token"), 0);
}

#[tokio::test]
async fn contract_uri_sets_metadata() {
    let mut h = Harness::new();
    h.new_project().await;
    h.emit(
        "NewContractURI",
        PROJECT,
        NewContractURI { contract_uri: "ipfs://project".into() },
    )
    .await;
    assert_eq!(h.project().ipfs_hash.as_deref(), Some("ipfs://project"));
}

#[tokio::test]
async fn contract_uri_without_project_is_noop() {
    let mut h = Harness::new();
    let other = address!("4444444444444444444444444444444444444444");
    h.storage.create(DRIPS_TOKEN, other).await.unwrap();

    let outcome = h
        .emit(
            "NewContractURI",
            other,
            NewContractURI { contract_uri: "ipfs://x".into() },
        )
        .await;
    assert!(matches!(outcome, Outcome::Handled { .. }));
    assert_eq!(h.storage.total(), 0);
}

#[tokio::test]
async fn malformed_params_fail_the_event() {
    let h = Harness::new();
    let event = DecodedEvent {
        schema: "Collected".into(),
        address: HUB,
        tx_hash: String::new(),
        block_number: 1,
        log_index: 0,
        params: serde_json::json!({ "user": "not-an-address" }),
    };
    let block = BlockSummary { number: 1, hash: String::new(), timestamp: 0 };
    let err = h.runtime.process(&event, &block).await.unwrap_err();
    assert!(err.is_decode());
}

// ─── Pipeline ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pipeline_replays_project_lifecycle() {
    let h = Harness::new();
    let storage = h.storage.clone();
    let pipeline = EventPipeline::spawn(Arc::new(h.runtime), 4);

    let events = vec![
        DecodedEvent::new(
            "NewProject",
            REGISTRY,
            1,
            &NewProject {
                funding_token: PROJECT,
                project_owner: OWNER,
                drip_token_template: TEMPLATE,
                name: "p".into(),
            },
        ),
        DecodedEvent::new(
            "NewToken",
            PROJECT,
            2,
            &NewToken { token_id: U256::from(1u64), receiver: ALICE, type_id: U256::ZERO },
        ),
        DecodedEvent::new(
            "Transfer",
            PROJECT,
            3,
            &Transfer { from: ALICE, to: BOB, token_id: U256::from(1u64) },
        ),
        DecodedEvent::new(
            "Collected",
            HUB,
            4,
            &Collected { user: PROJECT, collected: U256::from(9u64), split: U256::from(1u64) },
        ),
    ];
    for event in events {
        let event = event.unwrap();
        let block = BlockSummary { number: event.block_number, hash: String::new(), timestamp: 0 };
        pipeline.submit(EventRecord { block, event }).await.unwrap();
    }

    let stats = pipeline.join().await.unwrap();
    assert_eq!(stats.events_handled, 4);
    assert_eq!(stats.events_skipped, 0);

    let token: Token = storage.get(&token_id(&U256::from(1u64), &PROJECT)).unwrap();
    assert_eq!(token.token_receiver, BOB);
    let project: FundingProject = storage.get(&address_hex(&PROJECT)).unwrap();
    assert_eq!(project.dai_collected, U256::from(9u64));
}
