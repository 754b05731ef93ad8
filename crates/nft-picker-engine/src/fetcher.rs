//! Holding fetcher: raw wallet holdings, one indexer call per standard
//!
//! A failed call is logged and reads as an empty list for that standard.
//! The sibling standard is unaffected and the cycle carries on.

use std::sync::Arc;

use nft_picker_core::{Address, AssetStandard, ChainId, HoldingIndexer, RawHolding};
use tracing::{debug, warn};

/// Raw holdings of one wallet, split by standard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletHoldings {
    pub erc721: Vec<RawHolding>,
    pub erc1155: Vec<RawHolding>,
}

impl WalletHoldings {
    pub fn get(&self, standard: AssetStandard) -> &[RawHolding] {
        match standard {
            AssetStandard::Erc721 => &self.erc721,
            AssetStandard::Erc1155 => &self.erc1155,
        }
    }

    pub fn len(&self) -> usize {
        self.erc721.len() + self.erc1155.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches wallet holdings from the indexer
#[derive(Clone)]
pub struct HoldingFetcher {
    indexer: Arc<dyn HoldingIndexer>,
    page_size: usize,
}

impl HoldingFetcher {
    pub fn new(indexer: Arc<dyn HoldingIndexer>, page_size: usize) -> Self {
        Self { indexer, page_size }
    }

    /// Holdings of a single standard; errors collapse to an empty list
    pub async fn fetch_standard(
        &self,
        owner: &Address,
        chain_id: &ChainId,
        standard: AssetStandard,
    ) -> Vec<RawHolding> {
        match self
            .indexer
            .fetch(owner, chain_id, standard, self.page_size)
            .await
        {
            Ok(mut holdings) => {
                holdings.truncate(self.page_size);
                // The indexer answers per standard; anything else is not ours
                holdings.retain(|h| h.standard == standard);
                debug!(%owner, %standard, count = holdings.len(), "Fetched holdings");
                holdings
            }
            Err(e) => {
                warn!(%owner, %standard, error = %e, "Holding fetch failed, treating as empty");
                Vec::new()
            }
        }
    }

    /// Holdings of both standards, fetched concurrently
    pub async fn fetch_holdings(&self, owner: &Address, chain_id: &ChainId) -> WalletHoldings {
        let (erc721, erc1155) = tokio::join!(
            self.fetch_standard(owner, chain_id, AssetStandard::Erc721),
            self.fetch_standard(owner, chain_id, AssetStandard::Erc1155),
        );
        WalletHoldings { erc721, erc1155 }
    }
}
