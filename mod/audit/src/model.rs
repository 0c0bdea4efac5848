use serde::{Deserialize, Serialize};

use fieldops_core::types::{f64_or_false, i64_or_false, many2one_opt, string_or_false};
use fieldops_core::{Many2One, OdooId};

pub const SUMMARY_FIELDS: &[&str] = &[
    "id",
    "transaction_ref",
    "transaction_date",
    "partner_id",
    "audit_account_type",
    "amount_total",
    "amount_untaxed",
    "state",
    "salesperson_id",
];

pub const DETAIL_FIELDS: &[&str] = &[
    "id",
    "transaction_ref",
    "transaction_date",
    "audit_account_type",
    "partner_id",
    "amount_untaxed",
    "amount_tax",
    "has_tax",
    "amount_total",
    "salesperson_id",
    "created_by",
    "journal_id",
    "company_id",
    "currency_id",
    "customer_signature",
    "customer_signed_by",
    "customer_signed_date",
    "cashier_signature",
    "cashier_signed_by",
    "cashier_signed_date",
    "state",
    "audit_line_ids",
    "payment_method",
    "is_courier",
    "courier_proof",
    "courier_proof_filename",
];

pub const LINE_FIELDS: &[&str] = &[
    "id",
    "product_id",
    "name",
    "quantity",
    "price_unit",
    "tax_amount",
    "subtotal",
    "account_id",
];

pub const ATTACHMENT_FIELDS: &[&str] = &["id", "name", "mimetype", "file_size", "create_date"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSummary {
    pub id: OdooId,
    #[serde(default, deserialize_with = "string_or_false")]
    pub transaction_ref: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub transaction_date: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub partner_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub audit_account_type: Option<String>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub amount_total: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub amount_untaxed: Option<f64>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub salesperson_id: Option<Many2One>,
}

impl AuditSummary {
    /// Unset state is treated as a fresh draft.
    pub fn state_or_draft(&self) -> &str {
        self.state.as_deref().unwrap_or("draft")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditDetails {
    pub id: OdooId,
    #[serde(default, deserialize_with = "string_or_false")]
    pub transaction_ref: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub transaction_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub audit_account_type: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub partner_id: Option<Many2One>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub amount_untaxed: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub amount_tax: Option<f64>,
    #[serde(default)]
    pub has_tax: bool,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub amount_total: Option<f64>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub salesperson_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub created_by: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub journal_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub company_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub currency_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub customer_signature: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub customer_signed_by: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub customer_signed_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub cashier_signature: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub cashier_signed_by: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub cashier_signed_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub state: Option<String>,
    #[serde(default)]
    pub audit_line_ids: Vec<OdooId>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub is_courier: bool,
    #[serde(default, deserialize_with = "string_or_false")]
    pub courier_proof: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub courier_proof_filename: Option<String>,
    /// Resolved from `audit_line_ids` in a second call.
    #[serde(skip)]
    pub lines: Vec<AuditLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLine {
    pub id: OdooId,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub product_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub price_unit: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub tax_amount: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub subtotal: Option<f64>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub account_id: Option<Many2One>,
}

/// Attachment metadata; `datas` is fetched separately per record since
/// the payloads are too large for the list call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: OdooId,
    pub name: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub mimetype: Option<String>,
    #[serde(default, deserialize_with = "i64_or_false")]
    pub file_size: Option<i64>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub create_date: Option<String>,
    #[serde(skip)]
    pub datas: Option<String>,
}

impl Attachment {
    /// Inline data URI, when the payload was fetched.
    pub fn data_uri(&self) -> Option<String> {
        let datas = self.datas.as_ref()?;
        let mime = self.mimetype.as_deref().unwrap_or("image/png");
        Some(format!("data:{mime};base64,{datas}"))
    }
}

/// Input for a new audit record. The server fills partner, amounts,
/// and lines from the referenced account move.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuditInput {
    pub move_id: Option<OdooId>,
    pub customer_signature: Option<String>,
    pub customer_signed_by: Option<String>,
    pub customer_signed_date: Option<String>,
    pub cashier_signature: Option<String>,
    pub cashier_signed_by: Option<String>,
    pub cashier_signed_date: Option<String>,
    pub is_courier: Option<bool>,
    pub courier_proof: Option<String>,
}

/// Result of a batch attachment upload; partial failure is reported,
/// not fatal.
#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub ids: Vec<OdooId>,
    pub errors: Vec<String>,
}
