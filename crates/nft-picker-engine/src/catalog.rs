//! Catalog of hydrated assets
//!
//! [`build_catalog`] is a pure derivation: deduplicated assets plus the
//! distinct collection names in first-seen order. [`CatalogIndex`] holds the
//! committed catalog and only moves its version when the content changes.

use std::collections::HashSet;

use nft_picker_core::Asset;
use serde::Serialize;
use tracing::debug;

use crate::versioned::Versioned;

/// A deduplicated asset list and its collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Catalog {
    assets: Vec<Asset>,
    collections: Vec<String>,
}

impl Catalog {
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Distinct collection names, in the order they first appear
    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

/// Derive a catalog from a list of assets
///
/// Assets sharing an identity (contract, token, source address) keep only
/// their first occurrence.
pub fn build_catalog(assets: &[Asset]) -> Catalog {
    let mut seen = HashSet::new();
    let mut seen_collections = HashSet::new();
    let mut catalog = Catalog::default();

    for asset in assets {
        if !seen.insert(asset.identity()) {
            debug!(
                contract = %asset.contract_address,
                token_id = %asset.token_id,
                "Dropping duplicate asset"
            );
            continue;
        }
        if seen_collections.insert(asset.collection_name.as_str()) {
            catalog.collections.push(asset.collection_name.clone());
        }
        catalog.assets.push(asset.clone());
    }

    catalog
}

/// The committed catalog of one picker session
#[derive(Debug, Default)]
pub struct CatalogIndex {
    catalog: Versioned<Catalog>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from `assets` and commit if the result differs
    ///
    /// Returns whether the committed catalog changed.
    pub fn commit(&mut self, assets: &[Asset]) -> bool {
        let changed = self.catalog.replace_if_changed(build_catalog(assets));
        if changed {
            debug!(
                version = self.catalog.version(),
                count = self.catalog.get().len(),
                "Catalog committed"
            );
        }
        changed
    }

    /// Drop all assets
    pub fn clear(&mut self) -> bool {
        self.catalog.replace_if_changed(Catalog::default())
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog.get()
    }

    pub fn version(&self) -> u64 {
        self.catalog.version()
    }

    pub fn versioned(&self) -> &Versioned<Catalog> {
        &self.catalog
    }
}
