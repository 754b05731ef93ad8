//! Projection of a selected asset into form fields

use std::sync::Arc;

use nft_picker_core::{Address, Asset, FieldWrite, FormState, SelectionKey};
use serde_json::Value;
use tracing::debug;

use crate::config::ProjectionFields;

/// The full set of field writes for one selection
#[derive(Debug, Clone, PartialEq)]
pub struct FormProjection {
    pub writes: Vec<FieldWrite>,
}

impl FormProjection {
    /// Value written to `field`, if any
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.writes
            .iter()
            .find(|w| w.field == field)
            .map(|w| &w.value)
    }
}

/// Human-readable description of a sale of `asset`
pub fn describe(asset: &Asset) -> String {
    format!("Selling {} tokenId {}", asset.display_name, asset.token_id)
}

fn address_or_null(address: Option<&Address>) -> Value {
    address
        .map(|a| Value::String(a.to_string()))
        .unwrap_or(Value::Null)
}

/// Field writes for `asset`, in `fields` order
///
/// Vault fields are written as null for wallet assets, so a previous vault
/// selection never leaks into the form.
pub fn project(asset: &Asset, fields: &ProjectionFields) -> FormProjection {
    let image = asset
        .image_url
        .clone()
        .map(Value::String)
        .unwrap_or(Value::Null);

    FormProjection {
        writes: vec![
            FieldWrite::new(&fields.contract_address, asset.contract_address.as_str()),
            FieldWrite::new(&fields.token_id, asset.token_id.as_str()),
            FieldWrite::new(&fields.token_balance, asset.token_balance.to_string()),
            FieldWrite::new(&fields.description, describe(asset)),
            FieldWrite::new(&fields.image, image),
            FieldWrite::new(&fields.nft_type, asset.standard.tag()),
            FieldWrite::new(&fields.minion_address, address_or_null(asset.minion_address())),
            FieldWrite::new(&fields.safe_address, address_or_null(asset.safe_address())),
        ],
    }
}

/// Sole writer of the picker's field set in the form-state container
#[derive(Clone)]
pub struct ProjectionWriter {
    form: Arc<dyn FormState>,
    fields: ProjectionFields,
}

impl ProjectionWriter {
    pub fn new(form: Arc<dyn FormState>, fields: ProjectionFields) -> Self {
        Self { form, fields }
    }

    /// Register every projected field with the form
    pub fn register_fields(&self) {
        for field in self.fields.all() {
            self.form.register(field);
        }
    }

    /// Write the projection of `asset` in one batch
    pub fn write(&self, asset: &Asset) -> FormProjection {
        let projection = project(asset, &self.fields);
        self.form.apply(&projection.writes);
        debug!(
            contract = %asset.contract_address,
            token_id = %asset.token_id,
            fields = projection.writes.len(),
            "Projected selection into form"
        );
        projection
    }

    /// Selection key already stored in the form, if complete
    pub fn stored_key(&self) -> Option<SelectionKey> {
        let contract = self.form.get_value(&self.fields.contract_address);
        let token_id = self.form.get_value(&self.fields.token_id);
        SelectionKey::from_values(contract.as_ref(), token_id.as_ref())
    }

    pub fn fields(&self) -> &ProjectionFields {
        &self.fields
    }
}
