//! Metadata hydration
//!
//! Turns raw holdings into [`Asset`]s by looking up display metadata for each
//! one. Lookups run with bounded concurrency but results come back in input
//! order. Items whose lookup fails, or whose metadata has neither a name nor a
//! collection, are dropped and logged; the rest of the batch survives.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use nft_picker_core::{
    Address, Asset, AssetSource, HydrationError, MetadataService, RawHolding, TokenMetadata,
    VaultHolding,
};
use tracing::{debug, warn};

/// Balance assumed when the indexer leaves it out
const DEFAULT_BALANCE: u64 = 1;

/// Build an asset from a holding and its metadata
///
/// The display name falls back to the collection name, and the collection
/// name falls back to the display name. With neither, the item is malformed.
pub fn build_asset(
    raw: &RawHolding,
    metadata: TokenMetadata,
    source: AssetSource,
) -> Result<Asset, HydrationError> {
    let name = metadata.name.filter(|n| !n.trim().is_empty());
    let collection = metadata.collection_name.filter(|c| !c.trim().is_empty());

    let (display_name, collection_name) = match (name, collection) {
        (Some(name), Some(collection)) => (name, collection),
        (Some(name), None) => (name.clone(), name),
        (None, Some(collection)) => (collection.clone(), collection),
        (None, None) => {
            return Err(HydrationError::Malformed(format!(
                "{}/{} has no name and no collection",
                raw.contract_address, raw.token_id
            )));
        }
    };

    Ok(Asset {
        contract_address: raw.contract_address.clone(),
        token_id: raw.token_id.clone(),
        token_balance: raw.balance.unwrap_or(DEFAULT_BALANCE),
        standard: raw.standard,
        collection_name,
        display_name,
        image_url: metadata.image.filter(|i| !i.is_empty()),
        source,
    })
}

/// Looks up metadata for raw holdings
#[derive(Clone)]
pub struct MetadataHydrator {
    service: Arc<dyn MetadataService>,
    concurrency: usize,
}

impl MetadataHydrator {
    pub fn new(service: Arc<dyn MetadataService>, concurrency: usize) -> Self {
        Self {
            service,
            concurrency: concurrency.max(1),
        }
    }

    /// Hydrate holdings owned directly by `owner`
    pub async fn hydrate_wallet(&self, raw: Vec<RawHolding>, owner: &Address) -> Vec<Asset> {
        let items = raw
            .into_iter()
            .map(|holding| {
                let source = AssetSource::Wallet {
                    owner: owner.clone(),
                };
                (holding, source)
            })
            .collect();
        self.hydrate(items).await
    }

    /// Hydrate merged vault holdings
    pub async fn hydrate_vault(&self, holdings: Vec<VaultHolding>) -> Vec<Asset> {
        let items = holdings
            .into_iter()
            .map(|vh| (vh.holding, AssetSource::Vault { vaults: vh.vaults }))
            .collect();
        self.hydrate(items).await
    }

    async fn hydrate(&self, items: Vec<(RawHolding, AssetSource)>) -> Vec<Asset> {
        let requested = items.len();

        let results: Vec<Result<Asset, HydrationError>> = stream::iter(items)
            .map(|(raw, source)| async move {
                let metadata = self
                    .service
                    .lookup(&raw.contract_address, &raw.token_id, raw.standard)
                    .await?;
                build_asset(&raw, metadata, source)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let assets: Vec<Asset> = results
            .into_iter()
            .filter_map(|result| match result {
                Ok(asset) => Some(asset),
                Err(e) => {
                    warn!(error = %e, "Dropping holding that failed hydration");
                    None
                }
            })
            .collect();

        debug!(requested, hydrated = assets.len(), "Hydrated batch");
        assets
    }
}
