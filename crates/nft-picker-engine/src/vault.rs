//! Vault aggregation
//!
//! Queries organization vaults and merges holdings of the same token held by
//! several vaults into one [`VaultHolding`].

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use nft_picker_core::{Address, RawHolding, SelectionKey, VaultHolding, VaultRef, VaultRegistry};
use tracing::{debug, warn};

/// Merge per-vault holdings, keyed by (contract, token id)
///
/// Output order is the order each token was first seen. Each entry lists the
/// vaults holding it in first-seen order, without duplicates.
pub fn merge_vault_holdings(per_vault: Vec<(VaultRef, Vec<RawHolding>)>) -> Vec<VaultHolding> {
    let mut merged: Vec<VaultHolding> = Vec::new();
    let mut index: HashMap<SelectionKey, usize> = HashMap::new();

    for (vault, holdings) in per_vault {
        for holding in holdings {
            let key = holding.key();
            match index.get(&key).copied() {
                Some(i) => {
                    let entry = &mut merged[i];
                    if !entry.vaults.contains(&vault) {
                        entry.vaults.push(vault.clone());
                    }
                }
                None => {
                    index.insert(key, merged.len());
                    merged.push(VaultHolding {
                        holding,
                        vaults: vec![vault.clone()],
                    });
                }
            }
        }
    }

    merged
}

/// Collects holdings across the organization's vaults
#[derive(Clone)]
pub struct VaultAggregator {
    registry: Arc<dyn VaultRegistry>,
}

impl VaultAggregator {
    pub fn new(registry: Arc<dyn VaultRegistry>) -> Self {
        Self { registry }
    }

    /// Vaults to consult: all of them, or only the filtered minion
    pub fn vaults_for(&self, minion_filter: Option<&Address>) -> Vec<VaultRef> {
        let vaults = self.registry.vaults();
        match minion_filter {
            Some(minion) => vaults
                .into_iter()
                .filter(|v| &v.minion_address == minion)
                .collect(),
            None => vaults,
        }
    }

    /// Query the vaults concurrently and merge their holdings
    ///
    /// A vault that fails to answer contributes nothing.
    pub async fn aggregate(&self, minion_filter: Option<&Address>) -> Vec<VaultHolding> {
        let vaults = self.vaults_for(minion_filter);
        if vaults.is_empty() {
            debug!(filter = ?minion_filter, "No vaults to query");
            return Vec::new();
        }

        let queries = vaults.iter().map(|vault| self.registry.holdings(vault));
        let results = join_all(queries).await;

        let per_vault = vaults
            .into_iter()
            .zip(results)
            .map(|(vault, result)| match result {
                Ok(holdings) => (vault, holdings),
                Err(e) => {
                    warn!(minion = %vault.minion_address, error = %e, "Vault query failed, treating as empty");
                    (vault, Vec::new())
                }
            })
            .collect();

        let merged = merge_vault_holdings(per_vault);
        debug!(count = merged.len(), "Merged vault holdings");
        merged
    }
}
