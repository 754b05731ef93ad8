//! Picker session: one mounted picker and everything it owns
//!
//! A session reads assets from its current [`SourceMode`], keeps the catalog,
//! the filtered subset and the selection for that source, and writes the
//! selection into the form through its [`ProjectionWriter`].
//!
//! Fetching happens in cycles. [`PickerSession::begin_fetch`] hands out a
//! [`FetchCycle`] stamped with the session generation; the caller drives it
//! and feeds each batch back through [`PickerSession::apply_batch`]. Mode
//! switches and teardown bump the generation, so batches from an older cycle
//! are recognised and dropped when they land.
//!
//! ```ignore
//! let mut session = PickerSession::mount(config, sources, form, surface, mode, None)?;
//! session.refresh().await?;
//! session.set_filter(Some("Foo"))?;
//! session.open_picker()?;
//! session.pick(0)?;
//! ```

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use nft_picker_core::{
    Address, Asset, AssetStandard, ChainId, FormState, HoldingIndexer, MetadataService,
    PickerResult, PresentationSurface, SelectionKey, SessionError, VaultRegistry,
};
use nft_picker_logging::{CycleContext, PickerContext, SourceKind};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, Span, debug, info};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogIndex};
use crate::config::PickerConfig;
use crate::fetcher::HoldingFetcher;
use crate::filter::FilterPipeline;
use crate::hydrator::MetadataHydrator;
use crate::projection::ProjectionWriter;
use crate::resolver::SelectionResolver;
use crate::vault::VaultAggregator;

/// Services a session reads assets from
#[derive(Clone)]
pub struct PickerSources {
    pub indexer: Arc<dyn HoldingIndexer>,
    pub metadata: Arc<dyn MetadataService>,
    pub vaults: Arc<dyn VaultRegistry>,
}

impl PickerSources {
    pub fn new(
        indexer: Arc<dyn HoldingIndexer>,
        metadata: Arc<dyn MetadataService>,
        vaults: Arc<dyn VaultRegistry>,
    ) -> Self {
        Self {
            indexer,
            metadata,
            vaults,
        }
    }
}

/// Where the session lists assets from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceMode {
    /// The connected wallet on one chain
    Wallet { owner: Address, chain_id: ChainId },
    /// The organization's vaults, or only the one whose minion matches
    Vault {
        #[serde(default)]
        minion_filter: Option<Address>,
    },
}

impl SourceMode {
    pub fn wallet(owner: impl Into<Address>, chain_id: impl Into<ChainId>) -> Self {
        SourceMode::Wallet {
            owner: owner.into(),
            chain_id: chain_id.into(),
        }
    }

    pub fn vault(minion_filter: Option<Address>) -> Self {
        SourceMode::Vault { minion_filter }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceMode::Wallet { .. } => SourceKind::Wallet,
            SourceMode::Vault { .. } => SourceKind::Vault,
        }
    }
}

/// Which part of a cycle produced a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchOrigin {
    Wallet(AssetStandard),
    Vault,
}

/// Hydrated assets from one part of a fetch cycle
#[derive(Debug, Clone)]
pub struct FetchBatch {
    pub generation: u64,
    pub origin: BatchOrigin,
    pub assets: Vec<Asset>,
}

/// An in-flight fetch cycle
///
/// Yields one batch per standard in wallet mode, or a single batch in vault
/// mode, in completion order.
pub struct FetchCycle {
    context: CycleContext,
    pending: FuturesUnordered<BoxFuture<'static, FetchBatch>>,
}

impl FetchCycle {
    /// Next completed batch, or `None` once every part has finished
    pub async fn next_batch(&mut self) -> Option<FetchBatch> {
        self.pending.next().await
    }

    pub fn generation(&self) -> u64 {
        self.context.generation
    }

    pub fn context(&self) -> &CycleContext {
        &self.context
    }

    pub fn is_finished(&self) -> bool {
        self.pending.is_empty()
    }
}

/// One mounted picker
pub struct PickerSession {
    config: PickerConfig,
    /// Log attribution; `source` follows the mode
    context: PickerContext,
    fetcher: HoldingFetcher,
    hydrator: MetadataHydrator,
    aggregator: VaultAggregator,
    writer: ProjectionWriter,
    surface: Arc<dyn PresentationSurface>,
    mode: SourceMode,
    generation: u64,
    torn_down: bool,
    /// Assets of the current source, per batch origin, in first-arrival order
    batches: Vec<(BatchOrigin, Vec<Asset>)>,
    catalog: CatalogIndex,
    filter: FilterPipeline,
    resolver: SelectionResolver,
    selected: Option<Asset>,
}

impl PickerSession {
    /// Mount a picker: validate the config, register the form fields, and
    /// remember the selection to restore
    ///
    /// Without an explicit `stored_key`, the key is read back from the form.
    pub fn mount(
        config: PickerConfig,
        sources: PickerSources,
        form: Arc<dyn FormState>,
        surface: Arc<dyn PresentationSurface>,
        mode: SourceMode,
        stored_key: Option<SelectionKey>,
    ) -> PickerResult<Self> {
        config.validate()?;

        let writer = ProjectionWriter::new(form, config.fields.clone());
        writer.register_fields();
        let stored_key = stored_key.or_else(|| writer.stored_key());

        let session = Self {
            context: PickerContext::new(config.picker_id.clone(), mode.kind()),
            fetcher: HoldingFetcher::new(sources.indexer, config.page_size),
            hydrator: MetadataHydrator::new(sources.metadata, config.hydration_concurrency),
            aggregator: VaultAggregator::new(sources.vaults),
            writer,
            surface,
            mode,
            generation: 0,
            torn_down: false,
            batches: Vec::new(),
            catalog: CatalogIndex::new(),
            filter: FilterPipeline::new(),
            resolver: SelectionResolver::new(stored_key),
            selected: None,
            config,
        };

        let span = session.span();
        let _entered = span.enter();
        info!(
            restoring = session.resolver.pending().is_some(),
            "Picker mounted"
        );
        Ok(session)
    }

    /// Attribution stamped on this session's log entries
    pub fn log_context(&self) -> &PickerContext {
        &self.context
    }

    /// Span attributing entries to this session
    ///
    /// Synchronous operations enter it; fetch cycles use a
    /// [`CycleContext`] span carrying the same fields.
    pub fn span(&self) -> Span {
        self.context.span()
    }

    fn ensure_live(&self) -> PickerResult<()> {
        if self.torn_down {
            return Err(SessionError::TornDown.into());
        }
        Ok(())
    }

    /// Start a fetch cycle for the current source
    pub fn begin_fetch(&mut self) -> PickerResult<FetchCycle> {
        self.ensure_live()?;
        self.generation += 1;

        let context = CycleContext::new(&self.context, self.generation);
        let span = context.span();
        let generation = self.generation;
        let pending: FuturesUnordered<BoxFuture<'static, FetchBatch>> = FuturesUnordered::new();

        match &self.mode {
            SourceMode::Wallet { owner, chain_id } => {
                for standard in AssetStandard::ALL {
                    let fetcher = self.fetcher.clone();
                    let hydrator = self.hydrator.clone();
                    let owner = owner.clone();
                    let chain_id = chain_id.clone();
                    let task = async move {
                        let raw = fetcher.fetch_standard(&owner, &chain_id, standard).await;
                        let assets = hydrator.hydrate_wallet(raw, &owner).await;
                        FetchBatch {
                            generation,
                            origin: BatchOrigin::Wallet(standard),
                            assets,
                        }
                    };
                    pending.push(task.instrument(span.clone()).boxed());
                }
            }
            SourceMode::Vault { minion_filter } => {
                let aggregator = self.aggregator.clone();
                let hydrator = self.hydrator.clone();
                let minion_filter = minion_filter.clone();
                let task = async move {
                    let merged = aggregator.aggregate(minion_filter.as_ref()).await;
                    let assets = hydrator.hydrate_vault(merged).await;
                    FetchBatch {
                        generation,
                        origin: BatchOrigin::Vault,
                        assets,
                    }
                };
                pending.push(task.instrument(span.clone()).boxed());
            }
        }

        debug!(
            picker_id = %self.config.picker_id,
            generation,
            cycle_id = %context.cycle_id,
            parts = pending.len(),
            "Fetch cycle started"
        );
        Ok(FetchCycle { context, pending })
    }

    /// Fold a batch into the catalog
    ///
    /// Returns `false` for a batch from an older generation, which is dropped.
    pub fn apply_batch(&mut self, batch: FetchBatch) -> bool {
        if self.torn_down || batch.generation != self.generation {
            debug!(
                picker_id = %self.config.picker_id,
                batch_generation = batch.generation,
                generation = self.generation,
                "Discarding stale batch"
            );
            return false;
        }

        match self.batches.iter_mut().find(|(origin, _)| *origin == batch.origin) {
            Some((_, assets)) => *assets = batch.assets,
            None => self.batches.push((batch.origin, batch.assets)),
        }

        let assets: Vec<Asset> = self
            .batches
            .iter()
            .flat_map(|(_, assets)| assets.iter().cloned())
            .collect();
        if self.catalog.commit(&assets) {
            self.derive();
        }
        true
    }

    /// Re-derive the visible subset and retry the pending selection
    fn derive(&mut self) {
        self.filter.recompute(self.catalog.versioned());
        if let Some(asset) = self.resolver.poll(self.catalog.versioned()) {
            self.select(asset);
        }
    }

    /// Run a full fetch cycle to completion
    pub async fn refresh(&mut self) -> PickerResult<()> {
        let mut cycle = self.begin_fetch()?;
        let span = cycle.context().span();
        while let Some(batch) = cycle.next_batch().await {
            let _entered = span.enter();
            self.apply_batch(batch);
        }
        info!(
            picker_id = %self.config.picker_id,
            generation = cycle.generation(),
            assets = self.catalog.catalog().len(),
            elapsed_ms = cycle.context().elapsed_ms(),
            "Fetch cycle complete"
        );
        Ok(())
    }

    /// Set the collection filter; `None` or `""` shows everything
    ///
    /// Returns whether the visible subset changed.
    pub fn set_filter(&mut self, filter: Option<&str>) -> PickerResult<bool> {
        self.ensure_live()?;
        let _entered = self.span().entered();
        if !self.filter.set_filter(filter.map(str::to_string)) {
            return Ok(false);
        }
        Ok(self.filter.recompute(self.catalog.versioned()))
    }

    /// Ask the presentation surface to show the picker
    pub fn open_picker(&self) -> PickerResult<()> {
        self.ensure_live()?;
        self.surface.open(&self.config.picker_id);
        Ok(())
    }

    /// Pick the asset at `index` in the visible subset
    ///
    /// Closes the picker and projects the asset into the form. A user pick
    /// supersedes any selection still waiting to be restored.
    pub fn pick(&mut self, index: usize) -> PickerResult<Asset> {
        self.ensure_live()?;
        let _entered = self.span().entered();
        let visible = self.filter.visible();
        let asset = visible
            .get(index)
            .cloned()
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: visible.len(),
            })?;

        self.surface.close(&self.config.picker_id);
        if self.resolver.pending().is_some() {
            self.resolver.set_key(None);
        }
        self.select(asset.clone());
        Ok(asset)
    }

    /// Select `asset` and project it, unless it is already selected
    fn select(&mut self, asset: Asset) -> bool {
        if self.selected.as_ref() == Some(&asset) {
            debug!(picker_id = %self.config.picker_id, "Asset already selected");
            return false;
        }
        self.writer.write(&asset);
        let source = if asset.source.is_vault() {
            SourceKind::Vault
        } else {
            SourceKind::Wallet
        };
        info!(
            picker_id = %self.config.picker_id,
            contract = %asset.contract_address,
            token_id = %asset.token_id,
            %source,
            "Asset selected"
        );
        self.selected = Some(asset);
        true
    }

    /// Switch to another source
    ///
    /// Drops the catalog and the selection without touching the form, and
    /// orphans any in-flight cycle. Returns `false` if the mode is unchanged.
    pub fn switch_mode(&mut self, mode: SourceMode) -> PickerResult<bool> {
        self.ensure_live()?;
        if self.mode == mode {
            return Ok(false);
        }

        let _entered = self.span().entered();
        self.generation += 1;
        self.mode = mode;
        self.context.source = self.mode.kind();
        self.batches.clear();
        self.selected = None;
        if self.catalog.clear() {
            self.filter.recompute(self.catalog.versioned());
        }

        info!(
            source = %self.mode.kind(),
            generation = self.generation,
            "Source mode switched"
        );
        Ok(true)
    }

    /// Tear the session down; every later batch is stale
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        let _entered = self.span().entered();
        self.generation += 1;
        self.torn_down = true;
        info!(generation = self.generation, "Picker torn down");
    }

    /// Set a key to restore and try it against the current catalog
    pub fn restore_selection(&mut self, key: SelectionKey) -> PickerResult<Option<Asset>> {
        self.ensure_live()?;
        let _entered = self.span().entered();
        self.resolver.set_key(Some(key));
        match self.resolver.poll(self.catalog.versioned()) {
            Some(asset) => {
                self.select(asset.clone());
                Ok(Some(asset))
            }
            None => Ok(None),
        }
    }

    pub fn config(&self) -> &PickerConfig {
        &self.config
    }

    pub fn instance_id(&self) -> Uuid {
        self.context.instance_id
    }

    pub fn mode(&self) -> &SourceMode {
        &self.mode
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog.catalog()
    }

    pub fn catalog_version(&self) -> u64 {
        self.catalog.version()
    }

    pub fn collections(&self) -> &[String] {
        self.catalog.catalog().collections()
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.filter()
    }

    pub fn visible(&self) -> &[Asset] {
        self.filter.visible()
    }

    pub fn selected(&self) -> Option<&Asset> {
        self.selected.as_ref()
    }

    pub fn pending_key(&self) -> Option<&SelectionKey> {
        self.resolver.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nft_picker_core::{
        InMemoryFormState, MockIndexer, MockMetadataService, MockVaultRegistry, PickerError,
        RawHolding, RecordingSurface, TokenMetadata, VaultRef,
    };
    use serde_json::json;

    fn metadata(name: &str, collection: &str) -> TokenMetadata {
        TokenMetadata {
            name: Some(name.to_string()),
            image: None,
            collection_name: Some(collection.to_string()),
        }
    }

    fn sources() -> PickerSources {
        let indexer = MockIndexer::new()
            .with_holdings(
                "0xw",
                AssetStandard::Erc721,
                vec![RawHolding::new("0xA", "1", AssetStandard::Erc721)],
            )
            .with_holdings(
                "0xw",
                AssetStandard::Erc1155,
                vec![RawHolding::new("0xB", "2", AssetStandard::Erc1155).with_balance(4)],
            );
        let metadata = MockMetadataService::new()
            .with_metadata("0xA", "1", metadata("Foo #1", "Foo"))
            .with_metadata("0xB", "2", metadata("Bar #2", "Bar"))
            .with_metadata("0xC", "3", metadata("Baz #3", "Baz"));
        let vaults = MockVaultRegistry::new().with_vault(
            VaultRef::new("0xm1").with_safe("0xs1"),
            vec![RawHolding::new("0xC", "3", AssetStandard::Erc721)],
        );
        PickerSources::new(Arc::new(indexer), Arc::new(metadata), Arc::new(vaults))
    }

    fn mount(form: Arc<InMemoryFormState>) -> (PickerSession, Arc<RecordingSurface>) {
        let surface = Arc::new(RecordingSurface::new());
        let session = PickerSession::mount(
            PickerConfig::default(),
            sources(),
            form,
            surface.clone(),
            SourceMode::wallet("0xw", "0x1"),
            None,
        )
        .unwrap();
        (session, surface)
    }

    #[test]
    fn test_mount_registers_fields_and_reads_stored_key() {
        let form = Arc::new(InMemoryFormState::with_values([
            ("contractAddress", json!("0xA")),
            ("tokenId", json!("1")),
        ]));
        let (session, _) = mount(form.clone());

        assert_eq!(form.registered().len(), 8);
        assert_eq!(session.pending_key(), Some(&SelectionKey::new("0xA", "1")));
        assert_eq!(session.generation(), 0);
    }

    #[test]
    fn test_mount_rejects_invalid_config() {
        let result = PickerSession::mount(
            PickerConfig::default().with_page_size(0),
            sources(),
            Arc::new(InMemoryFormState::new()),
            Arc::new(RecordingSurface::new()),
            SourceMode::vault(None),
            None,
        );
        assert!(matches!(result, Err(PickerError::Config(_))));
    }

    #[tokio::test]
    async fn test_refresh_builds_catalog_from_both_standards() {
        let (mut session, _) = mount(Arc::new(InMemoryFormState::new()));
        session.refresh().await.unwrap();

        assert_eq!(session.catalog().len(), 2);
        assert_eq!(session.visible().len(), 2);
        let mut collections = session.collections().to_vec();
        collections.sort();
        assert_eq!(collections, vec!["Bar".to_string(), "Foo".to_string()]);
    }

    #[tokio::test]
    async fn test_pick_closes_surface_and_projects() {
        let form = Arc::new(InMemoryFormState::new());
        let (mut session, surface) = mount(form.clone());
        session.refresh().await.unwrap();
        session.set_filter(Some("Bar")).unwrap();
        session.open_picker().unwrap();
        assert!(surface.is_open("nftSelect"));

        let picked = session.pick(0).unwrap();
        assert_eq!(picked.token_id.as_str(), "2");
        assert!(!surface.is_open("nftSelect"));
        assert_eq!(form.get_value("tokenBalance"), Some(json!("4")));
        assert_eq!(form.get_value("nftType"), Some(json!("ERC1155")));

        // Picking the same asset again writes nothing
        session.pick(0).unwrap();
        assert_eq!(form.batches(), 1);
    }

    #[tokio::test]
    async fn test_pick_out_of_range() {
        let (mut session, _) = mount(Arc::new(InMemoryFormState::new()));
        let err = session.pick(0).unwrap_err();
        assert!(matches!(
            err,
            PickerError::Session(SessionError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[tokio::test]
    async fn test_switch_mode_clears_without_form_writes() {
        let form = Arc::new(InMemoryFormState::new());
        let (mut session, _) = mount(form.clone());
        session.refresh().await.unwrap();
        session.pick(0).unwrap();
        assert_eq!(form.batches(), 1);

        assert!(session.switch_mode(SourceMode::vault(None)).unwrap());
        assert!(session.selected().is_none());
        assert!(session.catalog().is_empty());
        assert!(session.visible().is_empty());
        assert_eq!(form.batches(), 1);

        session.refresh().await.unwrap();
        assert_eq!(session.catalog().len(), 1);
        assert_eq!(
            session.catalog().assets()[0].minion_address(),
            Some(&Address::from("0xm1"))
        );

        assert!(!session.switch_mode(SourceMode::vault(None)).unwrap());
    }

    #[tokio::test]
    async fn test_stale_batches_discarded() {
        let (mut session, _) = mount(Arc::new(InMemoryFormState::new()));
        let mut stale = session.begin_fetch().unwrap();
        session.switch_mode(SourceMode::vault(None)).unwrap();

        while let Some(batch) = stale.next_batch().await {
            assert!(!session.apply_batch(batch));
        }
        assert!(stale.is_finished());
        assert!(session.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_teardown_is_terminal() {
        let (mut session, _) = mount(Arc::new(InMemoryFormState::new()));
        let mut cycle = session.begin_fetch().unwrap();
        session.teardown();
        session.teardown();

        while let Some(batch) = cycle.next_batch().await {
            assert!(!session.apply_batch(batch));
        }
        assert!(session.is_torn_down());
        assert!(matches!(
            session.refresh().await,
            Err(PickerError::Session(SessionError::TornDown))
        ));
        assert!(session.set_filter(Some("Foo")).is_err());
        assert!(session.open_picker().is_err());
    }

    #[tokio::test]
    async fn test_restore_selection_after_load() {
        let form = Arc::new(InMemoryFormState::new());
        let (mut session, surface) = mount(form.clone());
        session.refresh().await.unwrap();

        let restored = session
            .restore_selection(SelectionKey::new("0xA", "1"))
            .unwrap()
            .unwrap();
        assert_eq!(restored.display_name, "Foo #1");
        assert_eq!(form.get_value("raribleDescription"), Some(json!("Selling Foo #1 tokenId 1")));
        assert!(surface.events().is_empty());

        assert!(session
            .restore_selection(SelectionKey::new("0xZ", "9"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_source_mode_serde() {
        let mode: SourceMode =
            serde_json::from_value(json!({ "kind": "vault", "minion_filter": "0xm1" })).unwrap();
        assert_eq!(mode, SourceMode::vault(Some("0xm1".into())));
        assert_eq!(mode.kind(), SourceKind::Vault);

        let mode: SourceMode = serde_json::from_value(json!({ "kind": "vault" })).unwrap();
        assert_eq!(mode, SourceMode::vault(None));
    }

    #[test]
    fn test_log_context_follows_source_mode() {
        let (mut session, _) = mount(Arc::new(InMemoryFormState::new()));
        let instance_id = session.instance_id();
        assert_eq!(session.log_context().source, SourceKind::Wallet);
        assert_eq!(session.log_context().picker_id, "nftSelect");

        session.switch_mode(SourceMode::vault(None)).unwrap();
        assert_eq!(session.log_context().source, SourceKind::Vault);
        assert_eq!(session.log_context().instance_id, instance_id);

        let cycle = session.begin_fetch().unwrap();
        assert_eq!(cycle.context().instance_id, instance_id);
        assert_eq!(cycle.context().source, SourceKind::Vault);
    }
}
