use serde::{Deserialize, Serialize};

use fieldops_core::types::{f64_or_false, many2one_opt, string_or_false};
use fieldops_core::{Many2One, OdooId};

pub const REQUEST_FIELDS: &[&str] = &[
    "id",
    "name",
    "date",
    "state",
    "total_value",
    "note",
    "urgency",
    "requesting_company_id",
    "requesting_location_id",
    "source_company_id",
    "source_location_id",
    "currency_id",
    "transfer_id",
    "transfer_state",
];

pub const DETAIL_FIELDS: &[&str] = &[
    "id",
    "name",
    "date",
    "state",
    "total_value",
    "note",
    "urgency",
    "requesting_company_id",
    "requesting_location_id",
    "source_company_id",
    "source_location_id",
    "currency_id",
    "line_ids",
    "sent_by_id",
    "sent_date",
    "approved_by_id",
    "approval_date",
    "approval_note",
    "requester_signature",
    "source_signature",
    "rejection_reason",
    "transfer_id",
    "transfer_state",
];

pub const LINE_FIELDS: &[&str] = &[
    "id",
    "product_id",
    "quantity",
    "uom_id",
    "unit_price",
    "subtotal",
    "available_qty",
    "stock_status",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequest {
    pub id: OdooId,
    #[serde(default, deserialize_with = "string_or_false")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub total_value: Option<f64>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub urgency: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub requesting_company_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub requesting_location_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub source_company_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub source_location_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub currency_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub transfer_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub transfer_state: Option<String>,
}

impl StockRequest {
    pub fn state_or_draft(&self) -> &str {
        self.state.as_deref().unwrap_or("draft")
    }

    pub fn urgency_or_normal(&self) -> &str {
        self.urgency.as_deref().unwrap_or("normal")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequestDetails {
    #[serde(flatten)]
    pub request: StockRequest,
    #[serde(default)]
    pub line_ids: Vec<OdooId>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub sent_by_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub sent_date: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub approved_by_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub approval_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub approval_note: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub requester_signature: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub source_signature: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub rejection_reason: Option<String>,
    /// Resolved from `line_ids` in a second call.
    #[serde(skip)]
    pub lines: Vec<StockRequestLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequestLine {
    pub id: OdooId,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub product_id: Option<Many2One>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub uom_id: Option<Many2One>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub subtotal: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub available_qty: Option<f64>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub stock_status: Option<String>,
}

/// A new request submitted straight into the `sent` state.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStockRequest {
    pub requesting_company_id: OdooId,
    pub source_company_id: OdooId,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub requester_signature: Option<String>,
    pub lines: Vec<NewStockLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStockLine {
    pub product_id: OdooId,
    pub quantity: f64,
    /// Falls back to the product's default unit when unset.
    #[serde(default)]
    pub uom_id: Option<OdooId>,
    #[serde(default)]
    pub unit_price: f64,
}

/// Partial update; unset fields are left alone. The signature fields
/// distinguish "leave as is" (`None`) from "clear" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct StockRequestPatch {
    pub note: Option<String>,
    pub urgency: Option<String>,
    pub rejection_reason: Option<String>,
    pub approval_note: Option<String>,
    pub requester_signature: Option<Option<String>>,
    pub source_signature: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn details_flatten_the_summary_fields() {
        let d: StockRequestDetails = serde_json::from_value(json!({
            "id": 11,
            "name": "ICSR/0011",
            "state": "approved",
            "urgency": false,
            "line_ids": [201],
            "sent_by_id": [3, "Jo"],
            "requester_signature": false,
        }))
        .unwrap();
        assert_eq!(d.request.id, 11);
        assert_eq!(d.request.state_or_draft(), "approved");
        assert_eq!(d.request.urgency_or_normal(), "normal");
        assert_eq!(d.line_ids, vec![201]);
        assert!(d.requester_signature.is_none());
    }
}
