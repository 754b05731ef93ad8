//! JSON fixtures describing a picker scenario
//!
//! A fixture lists what each in-memory service should serve, what the form
//! already holds, and what the simulated user does (filter, pick).

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use nft_picker_core::{
    Address, AssetStandard, FetchError, HydrationError, InMemoryFormState, MockIndexer,
    MockMetadataService, MockVaultRegistry, RawHolding, TokenId, TokenMetadata, VaultRef,
};
use nft_picker_engine::{PickerConfig, PickerSources, SourceMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Holdings of one wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletEntry {
    pub owner: Address,
    pub holdings: Vec<RawHolding>,
}

/// Metadata for one token; `missing` makes the lookup fail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub contract_address: Address,
    pub token_id: TokenId,
    #[serde(flatten)]
    pub metadata: TokenMetadata,
    #[serde(default)]
    pub missing: bool,
}

/// One vault and what it holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultEntry {
    #[serde(flatten)]
    pub vault: VaultRef,
    #[serde(default)]
    pub holdings: Vec<RawHolding>,
    /// Fail every query to this vault
    #[serde(default)]
    pub unavailable: bool,
}

/// What the simulated user does after the first load
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserActions {
    #[serde(default)]
    pub filter: Option<String>,
    /// Index into the visible subset
    #[serde(default)]
    pub pick: Option<usize>,
    /// Source to switch to after the pick, followed by another load
    #[serde(default)]
    pub switch_to: Option<SourceMode>,
}

/// A complete scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub config: PickerConfig,
    pub mode: SourceMode,
    #[serde(default)]
    pub wallets: Vec<WalletEntry>,
    /// Standards whose indexer calls fail
    #[serde(default)]
    pub failing_standards: Vec<AssetStandard>,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default)]
    pub vaults: Vec<VaultEntry>,
    /// Values already in the form when the picker mounts
    #[serde(default)]
    pub form: BTreeMap<String, Value>,
    #[serde(default)]
    pub actions: UserActions,
}

impl Fixture {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let fixture: Self = serde_json::from_str(json).context("invalid fixture JSON")?;
        fixture.config.validate().context("invalid picker config in fixture")?;
        Ok(fixture)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("failed to load fixture {}", path.display()))
    }

    /// In-memory services serving this fixture
    pub fn sources(&self) -> PickerSources {
        let mut indexer = MockIndexer::new();
        for wallet in &self.wallets {
            for standard in AssetStandard::ALL {
                let holdings: Vec<RawHolding> = wallet
                    .holdings
                    .iter()
                    .filter(|h| h.standard == standard)
                    .cloned()
                    .collect();
                indexer = indexer.with_holdings(wallet.owner.clone(), standard, holdings);
            }
        }
        for standard in &self.failing_standards {
            indexer = indexer.with_failure(
                *standard,
                FetchError::Status {
                    status: 503,
                    message: "simulated outage".to_string(),
                },
            );
        }

        let mut metadata = MockMetadataService::new();
        for entry in &self.metadata {
            metadata = if entry.missing {
                metadata.with_failure(
                    entry.contract_address.clone(),
                    entry.token_id.clone(),
                    HydrationError::Service("simulated lookup failure".to_string()),
                )
            } else {
                metadata.with_metadata(
                    entry.contract_address.clone(),
                    entry.token_id.clone(),
                    entry.metadata.clone(),
                )
            };
        }

        let mut vaults = MockVaultRegistry::new();
        for entry in &self.vaults {
            vaults = if entry.unavailable {
                vaults.with_failing_vault(
                    entry.vault.clone(),
                    FetchError::VaultUnavailable(entry.vault.minion_address.to_string()),
                )
            } else {
                vaults.with_vault(entry.vault.clone(), entry.holdings.clone())
            };
        }

        PickerSources::new(Arc::new(indexer), Arc::new(metadata), Arc::new(vaults))
    }

    /// Form prefilled with the fixture's values
    pub fn form(&self) -> Arc<InMemoryFormState> {
        Arc::new(InMemoryFormState::with_values(
            self.form.iter().map(|(k, v)| (k.clone(), v.clone())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_fixture_defaults() {
        let fixture = Fixture::from_json(
            r#"{ "mode": { "kind": "wallet", "owner": "0xw", "chain_id": "0x1" } }"#,
        )
        .unwrap();
        assert_eq!(fixture.config, PickerConfig::default());
        assert!(fixture.wallets.is_empty());
        assert!(fixture.actions.pick.is_none());
    }

    #[test]
    fn test_flattened_entries() {
        let fixture = Fixture::from_json(
            r#"{
                "mode": { "kind": "vault" },
                "metadata": [
                    { "contract_address": "0xA", "token_id": "1", "name": "Foo #1", "collection_name": "Foo" }
                ],
                "vaults": [
                    { "minion_address": "0xm1", "safe_address": "0xs1", "unavailable": true }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(fixture.metadata[0].metadata.name.as_deref(), Some("Foo #1"));
        assert!(!fixture.metadata[0].missing);
        assert_eq!(fixture.vaults[0].vault, VaultRef::new("0xm1").with_safe("0xs1"));
        assert!(fixture.vaults[0].unavailable);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Fixture::from_json(
            r#"{ "mode": { "kind": "vault" }, "config": { "page_size": 0 } }"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("page_size"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fixture.json");
        std::fs::write(&path, r#"{ "mode": { "kind": "vault", "minion_filter": "0xm1" } }"#).unwrap();

        let fixture = Fixture::load(&path).unwrap();
        assert_eq!(fixture.mode, SourceMode::vault(Some("0xm1".into())));
        assert!(Fixture::load(&dir.path().join("missing.json")).is_err());
    }
}
