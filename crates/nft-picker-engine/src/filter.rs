//! Collection filter over the committed catalog

use nft_picker_core::Asset;
use tracing::debug;

use crate::catalog::Catalog;
use crate::versioned::Versioned;

/// Assets of `catalog` in the named collection
///
/// An unset or empty filter passes everything through.
pub fn apply_filter(catalog: &Catalog, filter: Option<&str>) -> Vec<Asset> {
    match filter.filter(|f| !f.is_empty()) {
        None => catalog.assets().to_vec(),
        Some(collection) => catalog
            .assets()
            .iter()
            .filter(|a| a.collection_name == collection)
            .cloned()
            .collect(),
    }
}

/// Keeps the visible subset in step with the filter and catalog
#[derive(Debug, Default)]
pub struct FilterPipeline {
    filter: Versioned<Option<String>>,
    visible: Versioned<Vec<Asset>>,
    /// (filter version, catalog version) the visible subset was derived from
    computed_from: Option<(u64, u64)>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the collection filter; `""` clears it
    ///
    /// Returns whether the filter changed.
    pub fn set_filter(&mut self, filter: Option<String>) -> bool {
        let filter = filter.filter(|f| !f.is_empty());
        self.filter.replace_if_changed(filter)
    }

    /// Re-derive the visible subset if the filter or catalog moved
    ///
    /// Returns whether the visible subset changed.
    pub fn recompute(&mut self, catalog: &Versioned<Catalog>) -> bool {
        let inputs = (self.filter.version(), catalog.version());
        if self.computed_from == Some(inputs) {
            return false;
        }
        self.computed_from = Some(inputs);

        let visible = apply_filter(catalog.get(), self.filter.get().as_deref());
        let changed = self.visible.replace_if_changed(visible);
        if changed {
            debug!(
                filter = ?self.filter.get(),
                count = self.visible.get().len(),
                "Visible subset updated"
            );
        }
        changed
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.get().as_deref()
    }

    pub fn visible(&self) -> &[Asset] {
        self.visible.get()
    }

    pub fn visible_version(&self) -> u64 {
        self.visible.version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::catalog::tests::wallet_asset;

    fn sample() -> Catalog {
        build_catalog(&[
            wallet_asset("0xA", "1", "Foo"),
            wallet_asset("0xB", "2", "Bar"),
            wallet_asset("0xA", "3", "Foo"),
        ])
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let catalog = sample();
        assert_eq!(apply_filter(&catalog, Some("")), catalog.assets().to_vec());
        assert_eq!(apply_filter(&catalog, None), catalog.assets().to_vec());
    }

    #[test]
    fn test_filter_soundness() {
        let catalog = sample();
        let foo = apply_filter(&catalog, Some("Foo"));
        assert_eq!(foo.len(), 2);
        assert!(foo.iter().all(|a| a.collection_name == "Foo"));
        assert!(apply_filter(&catalog, Some("Baz")).is_empty());
    }

    #[test]
    fn test_pipeline_tracks_catalog_and_filter() {
        let mut catalog = Versioned::new(Catalog::default());
        let mut pipeline = FilterPipeline::new();

        // Empty catalog, empty visible subset: nothing to report
        assert!(!pipeline.recompute(&catalog));

        catalog.replace_if_changed(sample());
        assert!(pipeline.recompute(&catalog));
        assert_eq!(pipeline.visible().len(), 3);

        assert!(pipeline.set_filter(Some("Bar".to_string())));
        assert!(pipeline.recompute(&catalog));
        assert_eq!(pipeline.visible().len(), 1);

        // Same inputs, no recompute
        let version = pipeline.visible_version();
        assert!(!pipeline.recompute(&catalog));
        assert_eq!(pipeline.visible_version(), version);
    }

    #[test]
    fn test_equal_result_suppressed() {
        let mut catalog = Versioned::new(sample());
        let mut pipeline = FilterPipeline::new();
        pipeline.set_filter(Some("Bar".to_string()));
        pipeline.recompute(&catalog);
        let version = pipeline.visible_version();

        // New catalog version, same Bar subset
        let mut assets = catalog.get().assets().to_vec();
        assets.push(wallet_asset("0xC", "9", "Foo"));
        catalog.replace_if_changed(build_catalog(&assets));

        assert!(!pipeline.recompute(&catalog));
        assert_eq!(pipeline.visible_version(), version);
    }

    #[test]
    fn test_empty_string_clears_filter() {
        let mut pipeline = FilterPipeline::new();
        pipeline.set_filter(Some("Foo".to_string()));
        assert!(pipeline.set_filter(Some(String::new())));
        assert_eq!(pipeline.filter(), None);
        assert!(!pipeline.set_filter(None));
    }
}
