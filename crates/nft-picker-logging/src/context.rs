//! Picker attribution for log entries
//!
//! Several pickers can share a page, and one picker can be mounted more than
//! once. A [`PickerContext`] names one mounted instance; entering its
//! [`span`](PickerContext::span) records `picker_id`, `source` and
//! `instance_id` as span fields, so the formatting layers print them on every
//! entry logged inside.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which asset source a picker session is reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// The connected wallet's holdings
    Wallet,
    /// The organization's vault holdings
    Vault,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Wallet => write!(f, "wallet"),
            SourceKind::Vault => write!(f, "vault"),
        }
    }
}

/// Identity of one mounted picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerContext {
    /// The picker identifier (also the modal id)
    pub picker_id: String,
    /// Source the picker currently lists assets from
    pub source: SourceKind,
    /// Unique per mount
    pub instance_id: Uuid,
}

impl PickerContext {
    /// Context for a fresh mount
    pub fn new(picker_id: impl Into<String>, source: SourceKind) -> Self {
        Self::with_instance_id(picker_id, source, Uuid::new_v4())
    }

    /// Context that keeps an existing instance id
    pub fn with_instance_id(
        picker_id: impl Into<String>,
        source: SourceKind,
        instance_id: Uuid,
    ) -> Self {
        Self {
            picker_id: picker_id.into(),
            source,
            instance_id,
        }
    }

    /// Span carrying the picker's attribution fields
    ///
    /// ```ignore
    /// let ctx = PickerContext::new("nftSelect", SourceKind::Vault);
    /// let _entered = ctx.span().entered();
    /// tracing::info!("Loading vault assets"); // carries instance_id
    /// ```
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "picker",
            picker_id = %self.picker_id,
            source = %self.source,
            instance_id = %self.instance_id,
        )
    }
}
