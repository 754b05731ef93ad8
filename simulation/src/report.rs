//! Outcome of a simulated picker session

use std::collections::BTreeMap;
use std::fmt::Write as _;

use nft_picker_core::{Asset, AssetSource, SurfaceEvent};
use serde::Serialize;
use serde_json::Value;

/// Snapshot taken after one load of a source
#[derive(Debug, Clone, Serialize)]
pub struct LoadSnapshot {
    pub source: String,
    pub generation: u64,
    pub catalog: Vec<Asset>,
    pub collections: Vec<String>,
    pub visible: Vec<Asset>,
    pub selected: Option<Asset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub picker_id: String,
    pub loads: Vec<LoadSnapshot>,
    pub surface_events: Vec<String>,
    pub form: BTreeMap<String, Value>,
    pub form_batches: usize,
}

pub(crate) fn describe_event(event: &SurfaceEvent) -> String {
    match event {
        SurfaceEvent::Opened(id) => format!("open {}", id),
        SurfaceEvent::Closed(id) => format!("close {}", id),
    }
}

fn asset_line(asset: &Asset) -> String {
    let holder = match &asset.source {
        AssetSource::Wallet { owner } => format!("wallet {}", owner),
        AssetSource::Vault { vaults } => {
            let minions: Vec<_> = vaults.iter().map(|v| v.minion_address.as_str()).collect();
            format!("vault {}", minions.join(","))
        }
    };
    format!(
        "{} [{}] {}/{} x{} ({})",
        asset.display_name,
        asset.collection_name,
        asset.contract_address,
        asset.token_id,
        asset.token_balance,
        holder
    )
}

impl Report {
    /// Plain-text rendering for the terminal
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Picker {} ===", self.picker_id);

        for load in &self.loads {
            let _ = writeln!(out, "\n--- {} (generation {}) ---", load.source, load.generation);
            let _ = writeln!(out, "Catalog ({} assets):", load.catalog.len());
            for asset in &load.catalog {
                let _ = writeln!(out, "  {}", asset_line(asset));
            }
            let _ = writeln!(out, "Collections: {}", load.collections.join(", "));
            let _ = writeln!(out, "Visible ({}):", load.visible.len());
            for (i, asset) in load.visible.iter().enumerate() {
                let _ = writeln!(out, "  [{}] {}", i, asset_line(asset));
            }
            match &load.selected {
                Some(asset) => {
                    let _ = writeln!(out, "Selected: {}", asset_line(asset));
                }
                None => {
                    let _ = writeln!(out, "Selected: none");
                }
            }
        }

        let _ = writeln!(out, "\nSurface: {}", self.surface_events.join(" -> "));
        let _ = writeln!(out, "Form ({} batch writes):", self.form_batches);
        for (field, value) in &self.form {
            let _ = writeln!(out, "  {} = {}", field, value);
        }
        out
    }
}
