//! Collaborator traits for the NFT picker
//!
//! These traits describe the services the engine reads from and the
//! surfaces it writes to. None of them are implemented by the engine itself.
//!
//! ## Key Traits
//!
//! - [`HoldingIndexer`]: Wallet holdings per token standard
//! - [`MetadataService`]: Display metadata per token
//! - [`VaultRegistry`]: Organization vaults and their holdings
//! - [`FormState`]: Form-state container receiving the projection
//! - [`PresentationSurface`]: Modal open/close keyed by picker id

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FetchError, HydrationError};
use crate::types::{
    Address, AssetStandard, ChainId, FieldWrite, RawHolding, TokenId, TokenMetadata, VaultRef,
};

/// Indexer query surface for wallet holdings
///
/// One call returns at most `limit` holdings of a single standard.
#[async_trait]
pub trait HoldingIndexer: Send + Sync {
    async fn fetch(
        &self,
        owner: &Address,
        chain_id: &ChainId,
        standard: AssetStandard,
        limit: usize,
    ) -> Result<Vec<RawHolding>, FetchError>;
}

/// Per-token metadata lookup
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn lookup(
        &self,
        contract: &Address,
        token_id: &TokenId,
        standard: AssetStandard,
    ) -> Result<TokenMetadata, HydrationError>;
}

/// Snapshot of the organization's vaults
///
/// The vault list is a read-only snapshot supplied by the organization
/// context; holdings are queried per vault.
#[async_trait]
pub trait VaultRegistry: Send + Sync {
    /// All known vaults, in registry order
    fn vaults(&self) -> Vec<VaultRef>;

    /// Holdings of a single vault
    async fn holdings(&self, vault: &VaultRef) -> Result<Vec<RawHolding>, FetchError>;
}

/// External form-state container
///
/// The picker registers its field set once and writes only through
/// [`FormState::apply`], which implementations should make atomic with
/// respect to readers.
pub trait FormState: Send + Sync {
    /// Declare a field for later writes
    fn register(&self, field: &str);

    /// Set a single field value
    fn set_value(&self, field: &str, value: Value);

    /// Read a field value, if set
    fn get_value(&self, field: &str) -> Option<Value>;

    /// Apply a batch of writes
    fn apply(&self, writes: &[FieldWrite]) {
        for write in writes {
            self.set_value(&write.field, write.value.clone());
        }
    }
}

/// Modal presentation layer
pub trait PresentationSurface: Send + Sync {
    fn open(&self, picker_id: &str);

    fn close(&self, picker_id: &str);
}
