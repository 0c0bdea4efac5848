use serde::{Deserialize, Serialize};

use fieldops_core::types::{f64_or_false, i64_or_false, many2one_opt, string_or_false};
use fieldops_core::{Many2One, OdooId};

pub const PRODUCT_FIELDS: &[&str] = &[
    "id",
    "name",
    "list_price",
    "standard_price",
    "default_code",
    "uom_id",
    "image_128",
];

pub const BARCODE_FIELDS: &[&str] = &[
    "id",
    "name",
    "list_price",
    "default_code",
    "barcode",
    "uom_id",
    "image_128",
    "categ_id",
];

pub const DETAIL_FIELDS: &[&str] = &[
    "id",
    "name",
    "list_price",
    "default_code",
    "uom_id",
    "image_128",
    "description_sale",
    "categ_id",
    "qty_available",
    "virtual_available",
];

pub const CATEGORY_FIELDS: &[&str] = &["id", "name", "parent_id", "image_128", "sequence_no"];

pub const CUSTOMER_FIELDS: &[&str] = &[
    "id", "name", "email", "phone", "street", "street2", "city", "zip", "country_id",
];

pub const USER_FIELDS: &[&str] = &["id", "name", "login", "email", "partner_id", "image_128"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: OdooId,
    pub name: String,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub list_price: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub standard_price: Option<f64>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub default_code: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub barcode: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub uom_id: Option<Many2One>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub categ_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub image_128: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub description_sale: Option<String>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub qty_available: Option<f64>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub virtual_available: Option<f64>,
}

impl Product {
    /// Image as an inline data URI when the thumbnail came back in
    /// the record, otherwise the server's image controller URL.
    pub fn image_url(&self, base_url: &str) -> String {
        match self.image_128.as_deref().filter(|s| !s.is_empty()) {
            Some(b64) => format!("data:image/png;base64,{b64}"),
            None => format!(
                "{}/web/image?model=product.product&id={}&field=image_128",
                base_url.trim_end_matches('/'),
                self.id
            ),
        }
    }
}

/// Per-location on-hand quantity from `stock.quant`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    #[serde(default, deserialize_with = "many2one_opt")]
    pub location_id: Option<Many2One>,
    #[serde(default, deserialize_with = "f64_or_false")]
    pub quantity: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: OdooId,
    pub name: String,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub parent_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub image_128: Option<String>,
    /// Stored as a char column; numeric strings come back as text.
    #[serde(default, deserialize_with = "i64_or_false")]
    pub sequence_no: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: OdooId,
    pub name: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub street2: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub zip: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub country_id: Option<Many2One>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: OdooId,
    pub name: String,
    pub login: String,
    #[serde(default, deserialize_with = "string_or_false")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "many2one_opt")]
    pub partner_id: Option<Many2One>,
    #[serde(default, deserialize_with = "string_or_false")]
    pub image_128: Option<String>,
}

/// Filters for the product list.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category_id: Option<OdooId>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_url_prefers_inline_thumbnail() {
        let p: Product = serde_json::from_value(json!({
            "id": 4, "name": "Bolt", "image_128": "iVBORw0K",
        }))
        .unwrap();
        assert_eq!(
            p.image_url("https://erp.example.com"),
            "data:image/png;base64,iVBORw0K"
        );
    }

    #[test]
    fn image_url_falls_back_to_controller() {
        let p: Product = serde_json::from_value(json!({
            "id": 4, "name": "Bolt", "image_128": false,
        }))
        .unwrap();
        assert_eq!(
            p.image_url("https://erp.example.com/"),
            "https://erp.example.com/web/image?model=product.product&id=4&field=image_128"
        );
    }

    #[test]
    fn category_sequence_accepts_text() {
        let c: Category = serde_json::from_value(json!({
            "id": 2, "name": "Fasteners", "sequence_no": "4",
        }))
        .unwrap();
        assert_eq!(c.sequence_no, Some(4));

        let c: Category = serde_json::from_value(json!({
            "id": 3, "name": "Misc", "sequence_no": false,
        }))
        .unwrap();
        assert_eq!(c.sequence_no, None);
    }
}
