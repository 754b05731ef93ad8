//! Error types for the NFT picker

use thiserror::Error;

/// Top-level error type for the NFT picker
#[derive(Debug, Error)]
pub enum PickerError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Hydration error: {0}")]
    Hydration(#[from] HydrationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Errors from the holding indexer or a vault query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Indexer returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Vault unavailable: {0}")]
    VaultUnavailable(String),
}

/// Errors from per-token metadata hydration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HydrationError {
    #[error("No metadata for {contract} token {token_id}")]
    NotFound { contract: String, token_id: String },

    #[error("Malformed metadata: {0}")]
    Malformed(String),

    #[error("Metadata service failure: {0}")]
    Service(String),
}

/// Errors related to picker configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Form field name used twice: {0}")]
    DuplicateField(String),

    #[error("Failed to parse config: {0}")]
    Parse(String),
}

/// Errors from operations on a picker session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Picker session has been torn down")]
    TornDown,

    #[error("No visible asset at index {index} (visible: {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result type alias for picker operations
pub type PickerResult<T> = Result<T, PickerError>;
