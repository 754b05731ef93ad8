//! In-memory collaborators for testing
//!
//! Provides doubles for every collaborator trait so the engine can be
//! exercised without an indexer, a metadata service, or a UI.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nft_picker_core::{AssetStandard, MockIndexer, RawHolding};
//!
//! let indexer = MockIndexer::new()
//!     .with_holdings("0xwallet", AssetStandard::Erc721, vec![
//!         RawHolding::new("0xA", "1", AssetStandard::Erc721),
//!     ])
//!     .with_failure(AssetStandard::Erc1155, FetchError::Network("down".into()));
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::error::{FetchError, HydrationError};
use crate::traits::{FormState, HoldingIndexer, MetadataService, PresentationSurface, VaultRegistry};
use crate::types::{
    Address, AssetStandard, ChainId, FieldWrite, RawHolding, TokenId, TokenMetadata, VaultRef,
};

/// Indexer double keyed by (owner, standard)
#[derive(Default)]
pub struct MockIndexer {
    holdings: DashMap<(Address, AssetStandard), Vec<RawHolding>>,
    failures: DashMap<AssetStandard, FetchError>,
    delays: DashMap<AssetStandard, Duration>,
    calls: AtomicUsize,
}

impl MockIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these holdings for the owner and standard
    pub fn with_holdings(
        self,
        owner: impl Into<Address>,
        standard: AssetStandard,
        holdings: Vec<RawHolding>,
    ) -> Self {
        self.set_holdings(owner, standard, holdings);
        self
    }

    /// Fail every call for the standard
    pub fn with_failure(self, standard: AssetStandard, error: FetchError) -> Self {
        self.fail(standard, error);
        self
    }

    /// Replace what later calls serve for the owner and standard
    pub fn set_holdings(
        &self,
        owner: impl Into<Address>,
        standard: AssetStandard,
        holdings: Vec<RawHolding>,
    ) {
        self.holdings.insert((owner.into(), standard), holdings);
    }

    /// Fail later calls for the standard until [`recover`](Self::recover)
    pub fn fail(&self, standard: AssetStandard, error: FetchError) {
        self.failures.insert(standard, error);
    }

    pub fn recover(&self, standard: AssetStandard) {
        self.failures.remove(&standard);
    }

    /// Delay every call for the standard
    pub fn with_delay(self, standard: AssetStandard, delay: Duration) -> Self {
        self.delays.insert(standard, delay);
        self
    }

    /// Number of fetch calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HoldingIndexer for MockIndexer {
    async fn fetch(
        &self,
        owner: &Address,
        _chain_id: &ChainId,
        standard: AssetStandard,
        limit: usize,
    ) -> Result<Vec<RawHolding>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.get(&standard).map(|d| *d);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.get(&standard) {
            return Err(error.value().clone());
        }

        Ok(self
            .holdings
            .get(&(owner.clone(), standard))
            .map(|h| h.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// Metadata double keyed by (contract, token id)
///
/// Unknown tokens yield [`HydrationError::NotFound`].
#[derive(Default)]
pub struct MockMetadataService {
    entries: DashMap<(Address, TokenId), Result<TokenMetadata, HydrationError>>,
    lookups: AtomicUsize,
}

impl MockMetadataService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(
        self,
        contract: impl Into<Address>,
        token_id: impl Into<TokenId>,
        metadata: TokenMetadata,
    ) -> Self {
        self.entries
            .insert((contract.into(), token_id.into()), Ok(metadata));
        self
    }

    pub fn with_failure(
        self,
        contract: impl Into<Address>,
        token_id: impl Into<TokenId>,
        error: HydrationError,
    ) -> Self {
        self.entries
            .insert((contract.into(), token_id.into()), Err(error));
        self
    }

    /// Number of lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataService for MockMetadataService {
    async fn lookup(
        &self,
        contract: &Address,
        token_id: &TokenId,
        _standard: AssetStandard,
    ) -> Result<TokenMetadata, HydrationError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.entries.get(&(contract.clone(), token_id.clone())) {
            Some(entry) => entry.value().clone(),
            None => Err(HydrationError::NotFound {
                contract: contract.to_string(),
                token_id: token_id.to_string(),
            }),
        }
    }
}

/// Vault registry double with per-vault holdings or failures
#[derive(Default)]
pub struct MockVaultRegistry {
    vaults: Vec<VaultRef>,
    holdings: DashMap<Address, Result<Vec<RawHolding>, FetchError>>,
    queried: Mutex<Vec<Address>>,
}

impl MockVaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vault(mut self, vault: VaultRef, holdings: Vec<RawHolding>) -> Self {
        self.holdings
            .insert(vault.minion_address.clone(), Ok(holdings));
        self.vaults.push(vault);
        self
    }

    pub fn with_failing_vault(mut self, vault: VaultRef, error: FetchError) -> Self {
        self.holdings
            .insert(vault.minion_address.clone(), Err(error));
        self.vaults.push(vault);
        self
    }

    /// Minion addresses queried so far, in call order
    pub fn queried(&self) -> Vec<Address> {
        self.queried.lock().clone()
    }
}

#[async_trait]
impl VaultRegistry for MockVaultRegistry {
    fn vaults(&self) -> Vec<VaultRef> {
        self.vaults.clone()
    }

    async fn holdings(&self, vault: &VaultRef) -> Result<Vec<RawHolding>, FetchError> {
        self.queried.lock().push(vault.minion_address.clone());
        match self.holdings.get(&vault.minion_address) {
            Some(entry) => entry.value().clone(),
            None => Err(FetchError::VaultUnavailable(vault.minion_address.to_string())),
        }
    }
}

#[derive(Default)]
struct FormInner {
    registered: Vec<String>,
    values: BTreeMap<String, Value>,
    batches: usize,
}

/// Form-state container backed by a map
///
/// Batches from [`FormState::apply`] are written under one lock, so readers
/// never see half of a projection.
#[derive(Default)]
pub struct InMemoryFormState {
    inner: RwLock<FormInner>,
}

impl InMemoryFormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing values, as when editing a saved draft
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let form = Self::new();
        {
            let mut inner = form.inner.write();
            for (field, value) in values {
                inner.values.insert(field.into(), value);
            }
        }
        form
    }

    /// Registered field names, in registration order
    pub fn registered(&self) -> Vec<String> {
        self.inner.read().registered.clone()
    }

    /// Snapshot of all current values
    pub fn values(&self) -> BTreeMap<String, Value> {
        self.inner.read().values.clone()
    }

    /// Number of batches applied so far
    pub fn batches(&self) -> usize {
        self.inner.read().batches
    }
}

impl FormState for InMemoryFormState {
    fn register(&self, field: &str) {
        let mut inner = self.inner.write();
        if !inner.registered.iter().any(|f| f == field) {
            inner.registered.push(field.to_string());
        }
    }

    fn set_value(&self, field: &str, value: Value) {
        self.inner.write().values.insert(field.to_string(), value);
    }

    fn get_value(&self, field: &str) -> Option<Value> {
        self.inner.read().values.get(field).cloned()
    }

    fn apply(&self, writes: &[FieldWrite]) {
        let mut inner = self.inner.write();
        for write in writes {
            inner.values.insert(write.field.clone(), write.value.clone());
        }
        inner.batches += 1;
    }
}

/// Open/close signal observed by a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Opened(String),
    Closed(String),
}

/// Presentation surface that records every signal
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().clone()
    }

    /// Whether the last signal for the picker was an open
    pub fn is_open(&self, picker_id: &str) -> bool {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|e| match e {
                SurfaceEvent::Opened(id) if id == picker_id => Some(true),
                SurfaceEvent::Closed(id) if id == picker_id => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl PresentationSurface for RecordingSurface {
    fn open(&self, picker_id: &str) {
        self.events
            .lock()
            .push(SurfaceEvent::Opened(picker_id.to_string()));
    }

    fn close(&self, picker_id: &str) {
        self.events
            .lock()
            .push(SurfaceEvent::Closed(picker_id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_indexer_serves_holdings_and_limit() {
        let indexer = MockIndexer::new().with_holdings(
            "0xw",
            AssetStandard::Erc721,
            vec![
                RawHolding::new("0xA", "1", AssetStandard::Erc721),
                RawHolding::new("0xA", "2", AssetStandard::Erc721),
            ],
        );
        let owner = Address::from("0xw");
        let chain = ChainId::from("0x1");

        let all = indexer.fetch(&owner, &chain, AssetStandard::Erc721, 10).await.unwrap();
        assert_eq!(all.len(), 2);

        let page = indexer.fetch(&owner, &chain, AssetStandard::Erc721, 1).await.unwrap();
        assert_eq!(page.len(), 1);

        let none = indexer.fetch(&owner, &chain, AssetStandard::Erc1155, 10).await.unwrap();
        assert!(none.is_empty());
        assert_eq!(indexer.calls(), 3);
    }

    #[tokio::test]
    async fn test_indexer_failure_is_per_standard() {
        let indexer = MockIndexer::new()
            .with_failure(AssetStandard::Erc1155, FetchError::Network("down".to_string()));
        let owner = Address::from("0xw");
        let chain = ChainId::from("0x1");

        assert!(indexer.fetch(&owner, &chain, AssetStandard::Erc721, 10).await.is_ok());
        assert!(indexer.fetch(&owner, &chain, AssetStandard::Erc1155, 10).await.is_err());
    }

    #[tokio::test]
    async fn test_indexer_swaps_between_calls() {
        let indexer = MockIndexer::new();
        let owner = Address::from("0xw");
        let chain = ChainId::from("0x1");

        indexer.set_holdings(
            "0xw",
            AssetStandard::Erc721,
            vec![RawHolding::new("0xA", "1", AssetStandard::Erc721)],
        );
        indexer.fail(AssetStandard::Erc721, FetchError::Network("down".to_string()));
        assert!(indexer.fetch(&owner, &chain, AssetStandard::Erc721, 10).await.is_err());

        indexer.recover(AssetStandard::Erc721);
        let served = indexer.fetch(&owner, &chain, AssetStandard::Erc721, 10).await.unwrap();
        assert_eq!(served.len(), 1);
    }

    #[tokio::test]
    async fn test_metadata_unknown_token_is_not_found() {
        let service = MockMetadataService::new();
        let result = service
            .lookup(&"0xA".into(), &"1".into(), AssetStandard::Erc721)
            .await;
        assert!(matches!(result, Err(HydrationError::NotFound { .. })));
        assert_eq!(service.lookups(), 1);
    }

    #[tokio::test]
    async fn test_vault_registry_records_queries() {
        let registry = MockVaultRegistry::new()
            .with_vault(VaultRef::new("0xm1"), vec![])
            .with_failing_vault(VaultRef::new("0xm2"), FetchError::Decode("bad".to_string()));

        let vaults = registry.vaults();
        assert_eq!(vaults.len(), 2);
        assert!(registry.holdings(&vaults[0]).await.unwrap().is_empty());
        assert!(registry.holdings(&vaults[1]).await.is_err());
        assert_eq!(registry.queried(), vec![Address::from("0xm1"), Address::from("0xm2")]);
    }

    #[test]
    fn test_metadata_configured_failure() {
        let service = MockMetadataService::new()
            .with_failure("0xA", "1", HydrationError::Service("503".to_string()));
        let result = tokio_test::block_on(service.lookup(
            &"0xA".into(),
            &"1".into(),
            AssetStandard::Erc1155,
        ));
        assert_eq!(result, Err(HydrationError::Service("503".to_string())));
    }

    #[test]
    fn test_form_state_batches() {
        let form = InMemoryFormState::with_values([("tokenId", json!("3"))]);
        form.register("tokenId");
        form.register("tokenId");
        assert_eq!(form.registered(), vec!["tokenId".to_string()]);
        assert_eq!(form.get_value("tokenId"), Some(json!("3")));

        form.apply(&[FieldWrite::new("tokenId", "4"), FieldWrite::new("image", Value::Null)]);
        assert_eq!(form.batches(), 1);
        assert_eq!(form.get_value("tokenId"), Some(json!("4")));
        assert_eq!(form.get_value("image"), Some(Value::Null));
    }

    #[test]
    fn test_recording_surface_tracks_open_state() {
        let surface = RecordingSurface::new();
        assert!(!surface.is_open("nftSelect"));
        surface.open("nftSelect");
        assert!(surface.is_open("nftSelect"));
        surface.close("nftSelect");
        assert!(!surface.is_open("nftSelect"));
        assert_eq!(surface.events().len(), 2);
    }
}
