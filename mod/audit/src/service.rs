use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::warn;

use fieldops_core::{ClientError, OdooId, media};
use fieldops_rpc::{Domain, OdooClient, SearchReadOptions};

use crate::model::{
    ATTACHMENT_FIELDS, Attachment, AuditDetails, AuditInput, AuditLine, AuditSummary,
    DETAIL_FIELDS, LINE_FIELDS, SUMMARY_FIELDS, UploadOutcome,
};

pub struct AuditService {
    client: Arc<OdooClient>,
}

impl AuditService {
    pub fn new(client: Arc<OdooClient>) -> Self {
        Self { client }
    }

    /// Audit records, newest first.
    pub async fn audits(
        &self,
        options: SearchReadOptions,
    ) -> Result<Vec<AuditSummary>, ClientError> {
        self.client
            .search_read_as(
                "audit.transaction",
                Domain::new(),
                SUMMARY_FIELDS,
                options.or_order("transaction_date desc, id desc"),
            )
            .await
    }

    /// One audit with its transaction lines resolved.
    pub async fn audit_details(
        &self,
        audit_id: OdooId,
    ) -> Result<Option<AuditDetails>, ClientError> {
        let mut records: Vec<AuditDetails> = self
            .client
            .search_read_as(
                "audit.transaction",
                Domain::new().eq("id", audit_id),
                DETAIL_FIELDS,
                SearchReadOptions::limited(1),
            )
            .await?;
        let Some(mut details) = records.pop() else {
            return Ok(None);
        };

        if !details.audit_line_ids.is_empty() {
            let lines: Vec<AuditLine> = self
                .client
                .search_read_as(
                    "audit.transaction.line",
                    Domain::new().is_in("id", &details.audit_line_ids),
                    LINE_FIELDS,
                    SearchReadOptions::default(),
                )
                .await?;
            details.lines = lines;
        }
        Ok(Some(details))
    }

    pub async fn set_state(&self, audit_id: OdooId, state: &str) -> Result<(), ClientError> {
        self.client
            .write("audit.transaction", &[audit_id], json!({"state": state}))
            .await
    }

    /// Create an audit from an account move reference and sign-off
    /// data. Signature images may arrive as data URIs; only the raw
    /// base64 goes on the wire.
    pub async fn create(&self, input: &AuditInput) -> Result<OdooId, ClientError> {
        let mut vals = Map::new();
        if let Some(move_id) = input.move_id {
            vals.insert("move_id".to_string(), move_id.into());
        }
        for (key, value) in [
            ("customer_signature", &input.customer_signature),
            ("courier_proof", &input.courier_proof),
            ("cashier_signature", &input.cashier_signature),
        ] {
            if let Some(image) = value {
                vals.insert(key.to_string(), media::strip_data_uri(image).into());
            }
        }
        for (key, value) in [
            ("customer_signed_by", &input.customer_signed_by),
            ("customer_signed_date", &input.customer_signed_date),
            ("cashier_signed_by", &input.cashier_signed_by),
            ("cashier_signed_date", &input.cashier_signed_date),
        ] {
            if let Some(text) = value {
                vals.insert(key.to_string(), text.as_str().into());
            }
        }
        if let Some(is_courier) = input.is_courier {
            vals.insert("is_courier".to_string(), is_courier.into());
        }

        self.client
            .create("audit.transaction", Value::Object(vals))
            .await
    }

    /// Upload voucher images as attachments on an audit. Items that
    /// fail are reported in the outcome; the whole batch only errors
    /// when nothing went through.
    pub async fn upload_attachments(
        &self,
        audit_id: OdooId,
        items: &[String],
    ) -> Result<UploadOutcome, ClientError> {
        let mut outcome = UploadOutcome::default();
        for (i, item) in items.iter().enumerate() {
            let n = i + 1;
            let Some(mime) = media::data_uri_mime(item) else {
                outcome.errors.push(format!("item {n}: not a data URI"));
                continue;
            };
            let mime = mime.to_string();
            let datas = media::strip_data_uri(item);
            if datas.len() < 50 {
                outcome.errors.push(format!("item {n}: payload too small"));
                continue;
            }

            let name = format!(
                "audit_voucher_{audit_id}_{n}.{ext}",
                ext = media::extension_for_mime(&mime)
            );
            let vals = json!({
                "name": name,
                "type": "binary",
                "datas": datas,
                "res_model": "audit.transaction",
                "res_id": audit_id,
                "mimetype": mime,
            });
            match self
                .client
                .create_with_timeout(
                    "ir.attachment",
                    vals,
                    self.client.config().attachment_timeout,
                )
                .await
            {
                Ok(id) => outcome.ids.push(id),
                Err(err) => {
                    warn!(audit = audit_id, item = n, error = %err, "attachment upload failed");
                    outcome.errors.push(format!("item {n}: {err}"));
                }
            }
        }

        if outcome.ids.is_empty() {
            if let Some(first) = outcome.errors.first() {
                return Err(ClientError::Validation(format!(
                    "all attachments failed: {first}"
                )));
            }
        }
        Ok(outcome)
    }

    /// Attachments on an audit, with payloads fetched record by
    /// record. Individual payload failures leave `datas` unset.
    pub async fn attachments(&self, audit_id: OdooId) -> Result<Vec<Attachment>, ClientError> {
        let mut attachments: Vec<Attachment> = self
            .client
            .search_read_as(
                "ir.attachment",
                Domain::new()
                    .eq("res_model", "audit.transaction")
                    .eq("res_id", audit_id),
                ATTACHMENT_FIELDS,
                SearchReadOptions::default(),
            )
            .await?;

        for attachment in &mut attachments {
            match self
                .client
                .read("ir.attachment", &[attachment.id], &["datas"])
                .await
            {
                Ok(records) => {
                    attachment.datas = records
                        .first()
                        .and_then(|r| r.get("datas"))
                        .and_then(Value::as_str)
                        .map(str::to_string);
                }
                Err(err) => {
                    warn!(attachment = attachment.id, error = %err, "payload fetch failed");
                }
            }
        }
        Ok(attachments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldops_kv::MemoryStore;
    use fieldops_rpc::OdooConfig;
    use fieldops_rpc::testing::MockTransport;

    fn service_with(transport: Arc<MockTransport>) -> AuditService {
        let config = OdooConfig::new("https://erp.example.com", "prod", "jo", "secret");
        let client = OdooClient::new(config, transport, Arc::new(MemoryStore::new()));
        client.session().save("session_id=test").unwrap();
        AuditService::new(Arc::new(client))
    }

    const B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42g==";

    #[tokio::test]
    async fn details_resolve_lines_in_second_call() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([{
            "id": 3,
            "transaction_ref": "AUD/0003",
            "partner_id": [9, "Acme"],
            "audit_line_ids": [101, 102],
        }]));
        transport.push_result(json!([
            {"id": 101, "product_id": [4, "Bolt"], "quantity": 2.0, "subtotal": 40.0},
            {"id": 102, "product_id": [5, "Nut"], "quantity": 8.0, "subtotal": 16.0},
        ]));
        let service = service_with(transport.clone());

        let details = service.audit_details(3).await.unwrap().unwrap();
        assert_eq!(details.lines.len(), 2);
        assert_eq!(details.lines[0].product_id.as_ref().unwrap().id, 4);

        let requests = transport.requests();
        assert_eq!(requests[1].body["params"]["model"], "audit.transaction.line");
        assert_eq!(
            requests[1].body["params"]["args"][0],
            json!([["id", "in", [101, 102]]])
        );
    }

    #[tokio::test]
    async fn details_without_lines_skip_second_call() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([{"id": 3, "audit_line_ids": []}]));
        let service = service_with(transport.clone());

        let details = service.audit_details(3).await.unwrap().unwrap();
        assert!(details.lines.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn missing_audit_is_none() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([]));
        let service = service_with(transport);

        assert!(service.audit_details(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_strips_signature_prefixes_and_skips_unset() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!(31));
        let service = service_with(transport.clone());

        let input = AuditInput {
            move_id: Some(88),
            customer_signature: Some("data:image/png;base64,iVBORw0K".to_string()),
            customer_signed_by: Some("Acme Rep".to_string()),
            is_courier: Some(true),
            ..AuditInput::default()
        };
        assert_eq!(service.create(&input).await.unwrap(), 31);

        let vals = &transport.requests()[0].body["params"]["args"][0];
        assert_eq!(vals["move_id"], 88);
        assert_eq!(vals["customer_signature"], "iVBORw0K");
        assert_eq!(vals["customer_signed_by"], "Acme Rep");
        assert_eq!(vals["is_courier"], true);
        assert!(vals.get("cashier_signature").is_none());
    }

    #[tokio::test]
    async fn upload_reports_partial_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!(41));
        transport.push_fault("odoo.exceptions.ValidationError", "too large");
        let service = service_with(transport.clone());

        let items = vec![
            format!("data:image/png;base64,{B64}"),
            format!("data:application/pdf;base64,{B64}"),
        ];
        let outcome = service.upload_attachments(3, &items).await.unwrap();
        assert_eq!(outcome.ids, vec![41]);
        assert_eq!(outcome.errors.len(), 1);

        let vals = &transport.requests()[0].body["params"]["args"][0];
        assert_eq!(vals["name"], "audit_voucher_3_1.png");
        assert_eq!(vals["res_model"], "audit.transaction");
        assert_eq!(vals["mimetype"], "image/png");
    }

    #[tokio::test]
    async fn upload_with_nothing_through_is_an_error() {
        let transport = Arc::new(MockTransport::new());
        let service = service_with(transport);

        let items = vec!["not-a-data-uri".to_string()];
        assert!(matches!(
            service.upload_attachments(3, &items).await,
            Err(ClientError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn upload_of_nothing_is_a_noop() {
        let transport = Arc::new(MockTransport::new());
        let service = service_with(transport.clone());

        let outcome = service.upload_attachments(3, &[]).await.unwrap();
        assert!(outcome.ids.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn attachment_payload_failure_leaves_datas_unset() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([
            {"id": 41, "name": "audit_voucher_3_1.png", "mimetype": "image/png"},
            {"id": 42, "name": "audit_voucher_3_2.png", "mimetype": "image/png"},
        ]));
        transport.push_result(json!([{"id": 41, "datas": "iVBORw0K"}]));
        transport.push_fault("builtins.MemoryError", "out of memory");
        let service = service_with(transport);

        let attachments = service.attachments(3).await.unwrap();
        assert_eq!(attachments.len(), 2);
        assert_eq!(
            attachments[0].data_uri().unwrap(),
            "data:image/png;base64,iVBORw0K"
        );
        assert!(attachments[1].data_uri().is_none());
    }
}
