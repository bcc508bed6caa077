//! dripsindex-mappings: event handlers for the Radicle funding contracts.
//!
//! Handler groups:
//! - [`registry`]: `RadicleRegistry` and `DaiDripsHub` events
//! - [`token`]: `DripsToken` template events
//!
//! ```rust
//! use alloy_primitives::Address;
//! use dripsindex_core::HandlerRegistry;
//!
//! let mut handlers = HandlerRegistry::new();
//! dripsindex_mappings::register_all(&mut handlers);
//! assert!(handlers.handles("DaiDripsHub", "SplitsUpdated"));
//!
//! let manifest = dripsindex_mappings::manifest(Address::ZERO, Address::repeat_byte(1), 0);
//! assert!(manifest.has_template("DripsToken"));
//! ```

use alloy_primitives::Address;

use dripsindex_core::{HandlerRegistry, Manifest};

pub mod events;
pub mod registry;
pub mod token;

/// Project registry contract.
pub const RADICLE_REGISTRY: &str = "RadicleRegistry";
/// Drips hub contract (streams, splits, collection).
pub const DAI_DRIPS_HUB: &str = "DaiDripsHub";
/// Per-project token contract template.
pub const DRIPS_TOKEN: &str = "DripsToken";

/// Register every handler.
pub fn register_all(handlers: &mut HandlerRegistry) {
    handlers.on_mapping(registry::NewProjectHandler);
    handlers.on_mapping(registry::CollectedHandler);
    handlers.on_mapping(registry::DrippingHandler);
    handlers.on_mapping(registry::DrippingWithAccountHandler);
    handlers.on_mapping(registry::SplitsUpdatedHandler);
    handlers.on_mapping(registry::DripsUpdatedHandler);
    handlers.on_mapping(registry::DripsUpdatedWithAccountHandler);

    handlers.on_mapping(token::NewTypeHandler);
    handlers.on_mapping(token::NewStreamingTokenHandler);
    handlers.on_mapping(token::NewTokenHandler);
    handlers.on_mapping(token::TransferHandler);
    handlers.on_mapping(token::NewContractUriHandler);
}

/// Manifest for a deployment of the registry and hub contracts.
pub fn manifest(registry: Address, hub: Address, start_block: u64) -> Manifest {
    Manifest::default()
        .data_source(RADICLE_REGISTRY, registry, start_block)
        .data_source(DAI_DRIPS_HUB, hub, start_block)
        .template(DRIPS_TOKEN)
}
