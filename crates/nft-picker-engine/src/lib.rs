//! # NFT Picker Engine
//!
//! Synchronization engine behind the NFT picker. It fetches holdings from a
//! wallet or from an organization's vaults, hydrates them into assets, keeps a
//! deduplicated catalog, filters it by collection, restores a previously
//! stored selection, and writes the chosen asset into an external form.
//!
//! ## Pipeline
//!
//! ```text
//! HoldingFetcher ─┐
//!                 ├─> MetadataHydrator ─> CatalogIndex ─> FilterPipeline ─> pick
//! VaultAggregator ┘                            │                              │
//!                                              └──> SelectionResolver ──> ProjectionWriter
//! ```
//!
//! Every stage after hydration is driven by version counters: a stage reruns
//! only when one of its inputs actually changed.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nft_picker_engine::prelude::*;
//!
//! let mut session = PickerSession::mount(
//!     PickerConfig::default(),
//!     sources,
//!     form,
//!     surface,
//!     SourceMode::wallet("0xowner", "0x1"),
//!     None,
//! )?;
//! session.refresh().await?;
//! session.open_picker()?;
//! let asset = session.pick(0)?;
//! ```

pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod filter;
pub mod hydrator;
pub mod projection;
pub mod resolver;
pub mod session;
pub mod vault;
pub mod versioned;

pub mod prelude;

pub use catalog::{Catalog, CatalogIndex, build_catalog};
pub use config::{
    DEFAULT_HYDRATION_CONCURRENCY, DEFAULT_PAGE_SIZE, DEFAULT_PICKER_ID, PickerConfig,
    ProjectionFields,
};
pub use fetcher::{HoldingFetcher, WalletHoldings};
pub use filter::{FilterPipeline, apply_filter};
pub use hydrator::{MetadataHydrator, build_asset};
pub use projection::{FormProjection, ProjectionWriter, describe, project};
pub use resolver::{SelectionResolver, resolve_selection};
pub use session::{BatchOrigin, FetchBatch, FetchCycle, PickerSession, PickerSources, SourceMode};
pub use vault::{VaultAggregator, merge_vault_holdings};
pub use versioned::Versioned;
