//! Asset model shared by the picker engine and its collaborators
//!
//! Wallet-held and vault-held assets share one [`Asset`] type. What differs
//! between them lives in [`AssetSource`], so code that needs a minion or safe
//! address asks the source instead of probing optional fields.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Characters stripped from a standard label to form its tag
const STANDARD_SEPARATORS: &[char] = &['-', '_', ' '];

/// An on-chain address (wallet, contract, minion, or safe)
///
/// Compared by exact string equality.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display("{_0}")]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Token identifier within a contract (decimal uint256 as text)
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display("{_0}")]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TokenId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TokenId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Chain identifier as used by the indexer (e.g. `"0x1"`)
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display("{_0}")]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ChainId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Token standard of a holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssetStandard {
    #[serde(rename = "ERC-721", alias = "ERC721")]
    Erc721,
    #[serde(rename = "ERC-1155", alias = "ERC1155")]
    Erc1155,
}

impl AssetStandard {
    /// Both standards, in the order the fetcher queries them
    pub const ALL: [AssetStandard; 2] = [AssetStandard::Erc721, AssetStandard::Erc1155];

    /// Display label, e.g. `"ERC-721"`
    pub fn label(&self) -> &'static str {
        match self {
            AssetStandard::Erc721 => "ERC-721",
            AssetStandard::Erc1155 => "ERC-1155",
        }
    }

    /// Label with separators stripped, e.g. `"ERC721"`
    pub fn tag(&self) -> String {
        normalize_standard_tag(self.label())
    }
}

impl std::fmt::Display for AssetStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Strip separator characters from a standard label
pub fn normalize_standard_tag(label: &str) -> String {
    label
        .chars()
        .filter(|c| !STANDARD_SEPARATORS.contains(c))
        .collect()
}

/// A holding as reported by the indexer or a vault, before hydration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHolding {
    pub contract_address: Address,
    pub token_id: TokenId,
    pub standard: AssetStandard,
    /// Units held; the indexer omits it for single-owner tokens
    #[serde(default)]
    pub balance: Option<u64>,
}

impl RawHolding {
    pub fn new(
        contract_address: impl Into<Address>,
        token_id: impl Into<TokenId>,
        standard: AssetStandard,
    ) -> Self {
        Self {
            contract_address: contract_address.into(),
            token_id: token_id.into(),
            standard,
            balance: None,
        }
    }

    pub fn with_balance(mut self, balance: u64) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn key(&self) -> SelectionKey {
        SelectionKey::new(self.contract_address.clone(), self.token_id.clone())
    }
}

/// One organization vault: a minion contract and, optionally, the safe it controls
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultRef {
    pub minion_address: Address,
    #[serde(default)]
    pub safe_address: Option<Address>,
}

impl VaultRef {
    pub fn new(minion_address: impl Into<Address>) -> Self {
        Self {
            minion_address: minion_address.into(),
            safe_address: None,
        }
    }

    pub fn with_safe(mut self, safe_address: impl Into<Address>) -> Self {
        self.safe_address = Some(safe_address.into());
        self
    }
}

/// A raw holding reached through one or more vaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultHolding {
    pub holding: RawHolding,
    /// Vaults holding this token, in first-seen order, without duplicates
    pub vaults: Vec<VaultRef>,
}

/// Where an asset came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetSource {
    /// Held directly by a wallet
    Wallet { owner: Address },
    /// Held by one or more organization vaults
    Vault { vaults: Vec<VaultRef> },
}

impl AssetSource {
    /// The vault used for projection (the first one that reported the token)
    pub fn primary_vault(&self) -> Option<&VaultRef> {
        match self {
            AssetSource::Wallet { .. } => None,
            AssetSource::Vault { vaults } => vaults.first(),
        }
    }

    /// The address holding the asset: the wallet owner or the primary minion
    pub fn source_address(&self) -> Option<&Address> {
        match self {
            AssetSource::Wallet { owner } => Some(owner),
            AssetSource::Vault { .. } => self.primary_vault().map(|v| &v.minion_address),
        }
    }

    pub fn is_vault(&self) -> bool {
        matches!(self, AssetSource::Vault { .. })
    }
}

/// Display metadata returned by the metadata service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub collection_name: Option<String>,
}

/// A hydrated asset, ready to be listed, filtered, and selected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub contract_address: Address,
    pub token_id: TokenId,
    pub token_balance: u64,
    pub standard: AssetStandard,
    pub collection_name: String,
    pub display_name: String,
    pub image_url: Option<String>,
    pub source: AssetSource,
}

impl Asset {
    pub fn key(&self) -> SelectionKey {
        SelectionKey::new(self.contract_address.clone(), self.token_id.clone())
    }

    /// Identity within a catalog snapshot: contract, token, and source address
    pub fn identity(&self) -> AssetIdentity {
        AssetIdentity {
            contract_address: self.contract_address.clone(),
            token_id: self.token_id.clone(),
            source_address: self.source.source_address().cloned(),
        }
    }

    pub fn matches(&self, key: &SelectionKey) -> bool {
        self.contract_address == key.contract_address && self.token_id == key.token_id
    }

    pub fn minion_address(&self) -> Option<&Address> {
        self.source.primary_vault().map(|v| &v.minion_address)
    }

    pub fn safe_address(&self) -> Option<&Address> {
        self.source.primary_vault().and_then(|v| v.safe_address.as_ref())
    }
}

/// Uniqueness key of an asset within a catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetIdentity {
    pub contract_address: Address,
    pub token_id: TokenId,
    pub source_address: Option<Address>,
}

/// Minimal durable identity of a selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    pub contract_address: Address,
    pub token_id: TokenId,
}

impl SelectionKey {
    pub fn new(contract_address: impl Into<Address>, token_id: impl Into<TokenId>) -> Self {
        Self {
            contract_address: contract_address.into(),
            token_id: token_id.into(),
        }
    }

    /// Build a key from stored form values
    ///
    /// The contract must be a non-empty string. The token id may also be
    /// stored as a JSON integer, which is read as its decimal form. Anything
    /// else yields `None`.
    pub fn from_values(contract: Option<&Value>, token_id: Option<&Value>) -> Option<Self> {
        let contract = contract?.as_str().filter(|s| !s.is_empty())?;
        let token_id = match token_id? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) if n.is_u64() => n.to_string(),
            _ => return None,
        };
        Some(Self::new(contract, token_id))
    }
}

/// A single field write destined for the form-state container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldWrite {
    pub field: String,
    pub value: Value,
}

impl FieldWrite {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vault_asset(vaults: Vec<VaultRef>) -> Asset {
        Asset {
            contract_address: "0xA".into(),
            token_id: "1".into(),
            token_balance: 1,
            standard: AssetStandard::Erc721,
            collection_name: "Foo".to_string(),
            display_name: "Foo #1".to_string(),
            image_url: None,
            source: AssetSource::Vault { vaults },
        }
    }

    #[test]
    fn test_standard_labels_and_tags() {
        assert_eq!(AssetStandard::Erc721.label(), "ERC-721");
        assert_eq!(AssetStandard::Erc1155.label(), "ERC-1155");
        assert_eq!(AssetStandard::Erc721.tag(), "ERC721");
        assert_eq!(AssetStandard::Erc1155.tag(), "ERC1155");
        assert_eq!(format!("{}", AssetStandard::Erc1155), "ERC-1155");
    }

    #[test]
    fn test_normalize_strips_every_separator() {
        assert_eq!(normalize_standard_tag("ERC-7-2-1"), "ERC721");
        assert_eq!(normalize_standard_tag("ERC_1155"), "ERC1155");
        assert_eq!(normalize_standard_tag("ERC721"), "ERC721");
    }

    #[test]
    fn test_standard_serde_accepts_both_forms() {
        let a: AssetStandard = serde_json::from_value(json!("ERC-721")).unwrap();
        let b: AssetStandard = serde_json::from_value(json!("ERC1155")).unwrap();
        assert_eq!(a, AssetStandard::Erc721);
        assert_eq!(b, AssetStandard::Erc1155);
        assert_eq!(serde_json::to_value(a).unwrap(), json!("ERC-721"));
    }

    #[test]
    fn test_wallet_source_has_no_vault_fields() {
        let asset = Asset {
            source: AssetSource::Wallet { owner: "0xowner".into() },
            ..vault_asset(vec![])
        };
        assert_eq!(asset.minion_address(), None);
        assert_eq!(asset.safe_address(), None);
        assert_eq!(asset.identity().source_address, Some(Address::from("0xowner")));
        assert!(!asset.source.is_vault());
    }

    #[test]
    fn test_vault_source_uses_primary_vault() {
        let asset = vault_asset(vec![
            VaultRef::new("0xm1").with_safe("0xs1"),
            VaultRef::new("0xm2"),
        ]);
        assert_eq!(asset.minion_address(), Some(&Address::from("0xm1")));
        assert_eq!(asset.safe_address(), Some(&Address::from("0xs1")));
        assert_eq!(asset.identity().source_address, Some(Address::from("0xm1")));
        assert!(asset.source.is_vault());
    }

    #[test]
    fn test_selection_key_matching() {
        let asset = vault_asset(vec![VaultRef::new("0xm1")]);
        assert!(asset.matches(&SelectionKey::new("0xA", "1")));
        assert!(!asset.matches(&SelectionKey::new("0xA", "2")));
        assert!(!asset.matches(&SelectionKey::new("0xB", "1")));
        assert_eq!(asset.key(), SelectionKey::new("0xA", "1"));
    }

    #[test]
    fn test_selection_key_from_values() {
        let contract = json!("0xA");
        let token = json!("9");
        assert_eq!(
            SelectionKey::from_values(Some(&contract), Some(&token)),
            Some(SelectionKey::new("0xA", "9"))
        );

        let empty = json!("");
        assert_eq!(SelectionKey::from_values(Some(&contract), Some(&empty)), None);
        assert_eq!(SelectionKey::from_values(None, Some(&token)), None);
        assert_eq!(SelectionKey::from_values(Some(&json!(null)), Some(&token)), None);
    }

    #[test]
    fn test_selection_key_from_numeric_token_id() {
        let contract = json!("0xA");
        assert_eq!(
            SelectionKey::from_values(Some(&contract), Some(&json!(42))),
            Some(SelectionKey::new("0xA", "42"))
        );
        assert_eq!(
            SelectionKey::from_values(Some(&contract), Some(&json!(u64::MAX))),
            Some(SelectionKey::new("0xA", u64::MAX.to_string()))
        );

        // Fractions and negatives are never token ids
        assert_eq!(SelectionKey::from_values(Some(&contract), Some(&json!(1.5))), None);
        assert_eq!(SelectionKey::from_values(Some(&contract), Some(&json!(-1))), None);
        // The contract stays string-only
        assert_eq!(SelectionKey::from_values(Some(&json!(7)), Some(&json!("1"))), None);
    }

    #[test]
    fn test_raw_holding_builder() {
        let holding = RawHolding::new("0xA", "5", AssetStandard::Erc1155).with_balance(3);
        assert_eq!(holding.balance, Some(3));
        assert_eq!(holding.key(), SelectionKey::new("0xA", "5"));
    }
}
