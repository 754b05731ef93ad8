//! Convenient imports for embedding a picker.
//!
//! ```ignore
//! use nft_picker_engine::prelude::*;
//! ```

pub use crate::{
    // Session
    PickerSession, PickerSources, SourceMode, FetchCycle, FetchBatch, BatchOrigin,
    // Configuration
    PickerConfig, ProjectionFields,
    // Derived state
    Catalog, FormProjection,
};

pub use nft_picker_core::{
    Address, Asset, AssetSource, AssetStandard, ChainId, FormState, HoldingIndexer,
    MetadataService, PickerError, PickerResult, PresentationSurface, SelectionKey, TokenId,
    VaultRef, VaultRegistry,
};
