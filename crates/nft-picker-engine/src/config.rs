//! Configuration for a picker session

use std::collections::HashSet;

use nft_picker_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Default picker identifier, also used as the modal id
pub const DEFAULT_PICKER_ID: &str = "nftSelect";

/// Holdings requested per standard in one indexer call
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Metadata lookups in flight at once
pub const DEFAULT_HYDRATION_CONCURRENCY: usize = 8;

/// Configuration for a [`PickerSession`](crate::PickerSession)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    /// Picker identifier, used for the presentation surface and logs
    pub picker_id: String,
    /// Upper bound on holdings fetched per standard
    pub page_size: usize,
    /// Upper bound on concurrent metadata lookups
    pub hydration_concurrency: usize,
    /// Form field names written by the projection
    pub fields: ProjectionFields,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            picker_id: DEFAULT_PICKER_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            hydration_concurrency: DEFAULT_HYDRATION_CONCURRENCY,
            fields: ProjectionFields::default(),
        }
    }
}

impl PickerConfig {
    /// Create a configuration for a named picker
    pub fn with_picker_id(picker_id: impl Into<String>) -> Self {
        Self {
            picker_id: picker_id.into(),
            ..Self::default()
        }
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the hydration concurrency
    pub fn with_hydration_concurrency(mut self, concurrency: usize) -> Self {
        self.hydration_concurrency = concurrency;
        self
    }

    /// Set the projection field names
    pub fn with_fields(mut self, fields: ProjectionFields) -> Self {
        self.fields = fields;
        self
    }

    /// Parse a configuration from JSON; missing keys take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.picker_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "picker_id",
                reason: "must not be empty".to_string(),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.hydration_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "hydration_concurrency",
                reason: "must be greater than zero".to_string(),
            });
        }
        self.fields.validate()
    }
}

/// Form field names the projection writes to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionFields {
    pub contract_address: String,
    pub token_id: String,
    pub token_balance: String,
    pub description: String,
    pub image: String,
    pub nft_type: String,
    pub minion_address: String,
    pub safe_address: String,
}

impl Default for ProjectionFields {
    fn default() -> Self {
        Self {
            contract_address: "contractAddress".to_string(),
            token_id: "tokenId".to_string(),
            token_balance: "tokenBalance".to_string(),
            description: "raribleDescription".to_string(),
            image: "image".to_string(),
            nft_type: "nftType".to_string(),
            minion_address: "selectedMinion".to_string(),
            safe_address: "selectedSafeAddress".to_string(),
        }
    }
}

impl ProjectionFields {
    /// Field names in projection order
    pub fn all(&self) -> [&str; 8] {
        [
            self.contract_address.as_str(),
            self.token_id.as_str(),
            self.token_balance.as_str(),
            self.description.as_str(),
            self.image.as_str(),
            self.nft_type.as_str(),
            self.minion_address.as_str(),
            self.safe_address.as_str(),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for field in self.all() {
            if field.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "fields",
                    reason: "field names must not be empty".to_string(),
                });
            }
            if !seen.insert(field) {
                return Err(ConfigError::DuplicateField(field.to_string()));
            }
        }
        Ok(())
    }
}
