//! Correlation IDs for fetch cycles
//!
//! A fetch cycle may produce several batches that complete out of order,
//! and a stale cycle's batches are discarded. Tagging every log entry of a
//! cycle with one `cycle_id` makes it possible to follow a cycle from the
//! indexer call to the catalog commit (or to its discard).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::{PickerContext, SourceKind};

/// Correlation context for one fetch cycle of a picker session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleContext {
    /// Unique ID of this cycle
    pub cycle_id: Uuid,

    /// The picker that started the cycle
    pub picker_id: String,

    /// Instance of that picker
    pub instance_id: Uuid,

    /// Source the cycle reads from
    pub source: SourceKind,

    /// Session generation the cycle was started under
    ///
    /// Batches whose generation no longer matches the session are stale.
    pub generation: u64,

    /// When the cycle started
    pub started_at: DateTime<Utc>,
}

impl CycleContext {
    /// Create a context for a new cycle of `picker`
    pub fn new(picker: &PickerContext, generation: u64) -> Self {
        Self {
            cycle_id: Uuid::new_v4(),
            picker_id: picker.picker_id.clone(),
            instance_id: picker.instance_id,
            source: picker.source,
            generation,
            started_at: Utc::now(),
        }
    }

    /// Milliseconds since the cycle started
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0)
    }

    /// A span carrying the cycle's correlation fields
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "fetch_cycle",
            picker_id = %self.picker_id,
            instance_id = %self.instance_id,
            source = %self.source,
            generation = self.generation,
            cycle_id = %self.cycle_id,
        )
    }
}
