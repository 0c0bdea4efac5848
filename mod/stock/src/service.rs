use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::warn;

use fieldops_core::{ClientError, OdooId, media, time};
use fieldops_rpc::domain::term;
use fieldops_rpc::{Domain, OdooClient, SearchReadOptions};

use crate::model::{
    DETAIL_FIELDS, LINE_FIELDS, NewStockRequest, REQUEST_FIELDS, StockRequest,
    StockRequestDetails, StockRequestLine, StockRequestPatch,
};

const MODEL: &str = "intercompany.stock.request";
const LINE_MODEL: &str = "intercompany.stock.request.line";

pub struct StockService {
    client: Arc<OdooClient>,
}

impl StockService {
    pub fn new(client: Arc<OdooClient>) -> Self {
        Self { client }
    }

    /// Requests a company is involved in, on either side, newest first.
    pub async fn requests(
        &self,
        company_id: Option<OdooId>,
        options: SearchReadOptions,
    ) -> Result<Vec<StockRequest>, ClientError> {
        let mut domain = Domain::new();
        if let Some(company_id) = company_id {
            domain = domain.any(vec![
                term("requesting_company_id", "=", company_id),
                term("source_company_id", "=", company_id),
            ]);
        }
        self.client
            .search_read_as(
                MODEL,
                domain,
                REQUEST_FIELDS,
                options.or_order("date desc, id desc"),
            )
            .await
    }

    /// One request with its lines resolved.
    pub async fn request_details(
        &self,
        request_id: OdooId,
    ) -> Result<Option<StockRequestDetails>, ClientError> {
        let records = self.client.read(MODEL, &[request_id], DETAIL_FIELDS).await?;
        let Some(record) = records.into_iter().next() else {
            return Ok(None);
        };
        let mut details: StockRequestDetails =
            serde_json::from_value(record).map_err(|e| ClientError::Decode(e.to_string()))?;

        if !details.line_ids.is_empty() {
            let line_records = self
                .client
                .read(LINE_MODEL, &details.line_ids, LINE_FIELDS)
                .await?;
            details.lines = line_records
                .into_iter()
                .map(|record| {
                    serde_json::from_value::<StockRequestLine>(record)
                        .map_err(|e| ClientError::Decode(e.to_string()))
                })
                .collect::<Result<_, _>>()?;
        }
        Ok(Some(details))
    }

    /// Create a request directly in the `sent` state. Lines missing a
    /// unit of measure get the product default backfilled first.
    pub async fn create(&self, request: &NewStockRequest) -> Result<OdooId, ClientError> {
        let missing_uom: Vec<OdooId> = request
            .lines
            .iter()
            .filter(|l| l.uom_id.is_none())
            .map(|l| l.product_id)
            .collect();

        let mut product_uoms: HashMap<OdooId, OdooId> = HashMap::new();
        if !missing_uom.is_empty() {
            let products = self
                .client
                .read("product.product", &missing_uom, &["id", "uom_id"])
                .await?;
            for product in products {
                let id = product.get("id").and_then(Value::as_i64);
                let uom = match product.get("uom_id") {
                    Some(Value::Array(pair)) => pair.first().and_then(Value::as_i64),
                    Some(Value::Number(n)) => n.as_i64(),
                    _ => None,
                };
                if let (Some(id), Some(uom)) = (id, uom) {
                    product_uoms.insert(id, uom);
                }
            }
        }

        let mut vals = Map::new();
        vals.insert(
            "requesting_company_id".to_string(),
            request.requesting_company_id.into(),
        );
        vals.insert(
            "source_company_id".to_string(),
            request.source_company_id.into(),
        );
        vals.insert("state".to_string(), "sent".into());
        vals.insert("sent_date".to_string(), time::now_string().into());
        if let Some(note) = &request.note {
            vals.insert("note".to_string(), note.as_str().into());
        }
        if let Some(urgency) = &request.urgency {
            vals.insert("urgency".to_string(), urgency.as_str().into());
        }
        if let Some(signature) = &request.requester_signature {
            vals.insert(
                "requester_signature".to_string(),
                media::strip_data_uri(signature).into(),
            );
        }

        if !request.lines.is_empty() {
            let line_ids: Vec<Value> = request
                .lines
                .iter()
                .map(|line| {
                    let uom = line
                        .uom_id
                        .or_else(|| product_uoms.get(&line.product_id).copied());
                    if uom.is_none() {
                        warn!(product = line.product_id, "no unit of measure found");
                    }
                    json!([0, 0, {
                        "product_id": line.product_id,
                        "quantity": line.quantity,
                        "uom_id": uom.map(Value::from).unwrap_or(Value::Bool(false)),
                        "unit_price": line.unit_price,
                    }])
                })
                .collect();
            vals.insert("line_ids".to_string(), line_ids.into());
        }

        self.client.create(MODEL, Value::Object(vals)).await
    }

    /// Apply a partial update to a request.
    pub async fn update(
        &self,
        request_id: OdooId,
        patch: &StockRequestPatch,
    ) -> Result<(), ClientError> {
        let mut vals = Map::new();
        for (key, value) in [
            ("note", &patch.note),
            ("urgency", &patch.urgency),
            ("rejection_reason", &patch.rejection_reason),
            ("approval_note", &patch.approval_note),
        ] {
            if let Some(text) = value {
                vals.insert(key.to_string(), text.as_str().into());
            }
        }
        for (key, value) in [
            ("requester_signature", &patch.requester_signature),
            ("source_signature", &patch.source_signature),
        ] {
            match value {
                Some(Some(signature)) => {
                    vals.insert(key.to_string(), media::strip_data_uri(signature).into());
                }
                Some(None) => {
                    vals.insert(key.to_string(), Value::Bool(false));
                }
                None => {}
            }
        }
        if vals.is_empty() {
            return Ok(());
        }
        self.client
            .write(MODEL, &[request_id], Value::Object(vals))
            .await
    }

    /// Force a state directly, bypassing the workflow methods.
    pub async fn set_state(&self, request_id: OdooId, state: &str) -> Result<(), ClientError> {
        self.client
            .write(MODEL, &[request_id], json!({"state": state}))
            .await
    }

    /// Run a workflow action (`action_approve`, `action_reject`, ...).
    /// The acting company goes into the context; approval checks
    /// compare it against the request's source company.
    pub async fn action(
        &self,
        request_id: OdooId,
        action: &str,
        company_id: Option<OdooId>,
    ) -> Result<Value, ClientError> {
        let kwargs = match company_id {
            Some(company_id) => json!({"context": {"allowed_company_ids": [company_id]}}),
            None => json!({}),
        };
        self.client
            .call_kw(MODEL, action, json!([[request_id]]), kwargs)
            .await
    }
}
