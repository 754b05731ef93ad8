//! # NFT Picker Core
//!
//! Asset model, collaborator traits, and errors for the NFT picker engine.
//!
//! The engine reconciles assets from two disjoint sources (wallet holdings
//! reported by an indexer, and organization vault holdings) and writes the
//! chosen asset into an external form. Everything the engine talks to is
//! behind a trait defined here, so the same engine runs against real
//! services and against the in-memory doubles in [`mock`].
//!
//! ## Key Traits
//!
//! - [`HoldingIndexer`]: Raw holdings for a wallet, one call per standard
//! - [`MetadataService`]: Per-token display metadata lookup
//! - [`VaultRegistry`]: The organization's vaults and their holdings
//! - [`FormState`]: External form-state container written by the picker
//! - [`PresentationSurface`]: Open/close signal for the picker modal
//!
//! ## Key Types
//!
//! - [`RawHolding`]: Unhydrated holding as returned by the indexer
//! - [`Asset`]: Hydrated asset with an explicit [`AssetSource`]
//! - [`SelectionKey`]: Durable identity used to re-find a selection

pub mod error;
pub mod types;
pub mod traits;
pub mod mock;

// Re-export main types
pub use error::*;
pub use types::*;
pub use traits::*;
pub use mock::*;
