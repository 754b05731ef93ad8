//! Selection restore from a stored key
//!
//! When a form already carries a contract address and token id, the resolver
//! finds the matching asset once the catalog has loaded. It tries at most once
//! per (key version, catalog version) and gives up silently on a miss.

use nft_picker_core::{Asset, SelectionKey};
use tracing::debug;

use crate::catalog::Catalog;
use crate::versioned::Versioned;

/// First asset in `catalog` matching `key` exactly
pub fn resolve_selection(key: &SelectionKey, catalog: &Catalog) -> Option<Asset> {
    catalog.assets().iter().find(|a| a.matches(key)).cloned()
}

#[derive(Debug, Default)]
pub struct SelectionResolver {
    pending: Versioned<Option<SelectionKey>>,
    last_attempt: Option<(u64, u64)>,
}

impl SelectionResolver {
    pub fn new(key: Option<SelectionKey>) -> Self {
        Self {
            pending: Versioned::new(key),
            last_attempt: None,
        }
    }

    /// Replace the pending key
    pub fn set_key(&mut self, key: Option<SelectionKey>) {
        self.pending.replace(key);
    }

    pub fn pending(&self) -> Option<&SelectionKey> {
        self.pending.get().as_ref()
    }

    /// Try to resolve the pending key against `catalog`
    ///
    /// A hit consumes the key.
    pub fn poll(&mut self, catalog: &Versioned<Catalog>) -> Option<Asset> {
        let key = self.pending.get().as_ref()?;
        if catalog.get().is_empty() {
            return None;
        }

        let attempt = (self.pending.version(), catalog.version());
        if self.last_attempt == Some(attempt) {
            return None;
        }
        self.last_attempt = Some(attempt);

        match resolve_selection(key, catalog.get()) {
            Some(asset) => {
                debug!(contract = %key.contract_address, token_id = %key.token_id, "Restored selection");
                self.pending.replace(None);
                Some(asset)
            }
            None => {
                debug!(
                    contract = %key.contract_address,
                    token_id = %key.token_id,
                    catalog_version = catalog.version(),
                    "Stored selection not in catalog"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::catalog::tests::wallet_asset;

    #[test]
    fn test_resolve_exact_match_and_miss() {
        let catalog = build_catalog(&[wallet_asset("0xA", "1", "Foo"), wallet_asset("0xA", "2", "Foo")]);

        let hit = resolve_selection(&SelectionKey::new("0xA", "2"), &catalog).unwrap();
        assert_eq!(hit.token_id.as_str(), "2");

        assert!(resolve_selection(&SelectionKey::new("0xa", "2"), &catalog).is_none());
        assert!(resolve_selection(&SelectionKey::new("0xA", "3"), &catalog).is_none());
    }

    #[test]
    fn test_poll_waits_for_catalog() {
        let mut resolver = SelectionResolver::new(Some(SelectionKey::new("0xA", "1")));
        let mut catalog = Versioned::new(Catalog::default());

        assert!(resolver.poll(&catalog).is_none());
        assert!(resolver.pending().is_some());

        catalog.replace_if_changed(build_catalog(&[wallet_asset("0xA", "1", "Foo")]));
        let asset = resolver.poll(&catalog).unwrap();
        assert_eq!(asset.contract_address.as_str(), "0xA");

        // Consumed
        assert!(resolver.pending().is_none());
        assert!(resolver.poll(&catalog).is_none());
    }

    #[test]
    fn test_poll_once_per_version_pair() {
        let mut resolver = SelectionResolver::new(Some(SelectionKey::new("0xA", "9")));
        let mut catalog = Versioned::new(build_catalog(&[wallet_asset("0xA", "1", "Foo")]));

        assert!(resolver.poll(&catalog).is_none());
        assert_eq!(resolver.last_attempt, Some((0, 0)));

        // Same versions, not retried
        assert!(resolver.poll(&catalog).is_none());
        assert_eq!(resolver.last_attempt, Some((0, 0)));

        catalog.replace_if_changed(build_catalog(&[
            wallet_asset("0xA", "1", "Foo"),
            wallet_asset("0xA", "9", "Foo"),
        ]));
        assert!(resolver.poll(&catalog).is_some());
    }

    #[test]
    fn test_no_key_never_resolves() {
        let mut resolver = SelectionResolver::new(None);
        let catalog = Versioned::new(build_catalog(&[wallet_asset("0xA", "1", "Foo")]));
        assert!(resolver.poll(&catalog).is_none());
        assert_eq!(resolver.last_attempt, None);
    }
}
