use std::sync::Arc;

use tracing::debug;

use fieldops_core::{ClientError, OdooId};
use fieldops_rpc::domain::term;
use fieldops_rpc::{Domain, OdooClient, SearchReadOptions};

use crate::model::{
    BARCODE_FIELDS, CATEGORY_FIELDS, CUSTOMER_FIELDS, Category, Customer, DETAIL_FIELDS,
    PRODUCT_FIELDS, Product, ProductQuery, StockLevel, USER_FIELDS, User,
};

pub struct CatalogService {
    client: Arc<OdooClient>,
}

impl CatalogService {
    pub fn new(client: Arc<OdooClient>) -> Self {
        Self { client }
    }

    /// Salable products, filtered by category and/or name.
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ClientError> {
        let mut domain = Domain::new().eq("sale_ok", true);
        if let Some(category_id) = query.category_id {
            domain = domain.eq("categ_id", category_id);
        }
        if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            domain = domain.ilike("name", term);
        }
        self.client
            .search_read_as(
                "product.product",
                domain,
                PRODUCT_FIELDS,
                SearchReadOptions {
                    limit: Some(query.limit.unwrap_or(50)),
                    offset: query.offset,
                    order: Some("name asc".to_string()),
                },
            )
            .await
    }

    pub async fn product_by_barcode(
        &self,
        barcode: &str,
    ) -> Result<Option<Product>, ClientError> {
        let mut records: Vec<Product> = self
            .client
            .search_read_as(
                "product.product",
                Domain::new().eq("barcode", barcode),
                BARCODE_FIELDS,
                SearchReadOptions::limited(1),
            )
            .await?;
        if records.is_empty() {
            debug!(barcode, "no product for barcode");
        }
        Ok(records.pop())
    }

    /// One product with its per-location stock levels.
    pub async fn product_details(
        &self,
        product_id: OdooId,
    ) -> Result<Option<(Product, Vec<StockLevel>)>, ClientError> {
        let mut records: Vec<Product> = self
            .client
            .search_read_as(
                "product.product",
                Domain::new().eq("id", product_id),
                DETAIL_FIELDS,
                SearchReadOptions::limited(1),
            )
            .await?;
        let Some(product) = records.pop() else {
            return Ok(None);
        };

        let stock: Vec<StockLevel> = self
            .client
            .search_read_as(
                "stock.quant",
                Domain::new().eq("product_id", product_id),
                &["location_id", "quantity"],
                SearchReadOptions::default(),
            )
            .await?;
        Ok(Some((product, stock)))
    }

    /// Categories sorted for display: sequenced ones first in sequence
    /// order, then the rest by name.
    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        let mut categories: Vec<Category> = self
            .client
            .search_read_as(
                "product.category",
                Domain::new(),
                CATEGORY_FIELDS,
                SearchReadOptions::default(),
            )
            .await?;
        categories.sort_by(|a, b| match (a.sequence_no, b.sequence_no) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        });
        Ok(categories)
    }

    /// Customers matched on name or phone.
    pub async fn customers(
        &self,
        search: Option<&str>,
        options: SearchReadOptions,
    ) -> Result<Vec<Customer>, ClientError> {
        let mut domain = Domain::new();
        if let Some(needle) = search.map(str::trim).filter(|t| !t.is_empty()) {
            domain = domain.any(vec![
                term("name", "ilike", needle),
                term("phone", "ilike", needle),
            ]);
        }
        self.client
            .search_read_as("res.partner", domain, CUSTOMER_FIELDS, options)
            .await
    }

    /// Active users, optionally matched on name.
    pub async fn users(
        &self,
        search: Option<&str>,
        options: SearchReadOptions,
    ) -> Result<Vec<User>, ClientError> {
        let mut domain = Domain::new().eq("active", true);
        if let Some(needle) = search.map(str::trim).filter(|t| !t.is_empty()) {
            domain = domain.ilike("name", needle);
        }
        self.client
            .search_read_as(
                "res.users",
                domain,
                USER_FIELDS,
                options.or_order("name asc"),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldops_kv::MemoryStore;
    use fieldops_rpc::OdooConfig;
    use fieldops_rpc::testing::MockTransport;
    use serde_json::json;

    fn service_with(transport: Arc<MockTransport>) -> CatalogService {
        let config = OdooConfig::new("https://erp.example.com", "prod", "jo", "secret");
        let client = OdooClient::new(config, transport, Arc::new(MemoryStore::new()));
        client.session().save("session_id=test").unwrap();
        CatalogService::new(Arc::new(client))
    }

    #[tokio::test]
    async fn product_domain_stacks_every_filter() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([]));
        let service = service_with(transport.clone());

        service
            .products(&ProductQuery {
                search: Some("bolt".to_string()),
                category_id: Some(2),
                ..ProductQuery::default()
            })
            .await
            .unwrap();

        let params = &transport.requests()[0].body["params"];
        assert_eq!(
            params["args"][0],
            json!([
                ["sale_ok", "=", true],
                ["categ_id", "=", 2],
                ["name", "ilike", "bolt"],
            ])
        );
        assert_eq!(params["kwargs"]["limit"], 50);
        assert_eq!(params["kwargs"]["order"], "name asc");
    }

    #[tokio::test]
    async fn barcode_match_is_exact_and_single() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([{
            "id": 4, "name": "Bolt", "barcode": "6291041500213", "categ_id": [2, "Fasteners"],
        }]));
        let service = service_with(transport.clone());

        let product = service
            .product_by_barcode("6291041500213")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.categ_id.as_ref().unwrap().id, 2);

        let params = &transport.requests()[0].body["params"];
        assert_eq!(params["args"][0], json!([["barcode", "=", "6291041500213"]]));
        assert_eq!(params["kwargs"]["limit"], 1);
    }

    #[tokio::test]
    async fn details_include_stock_levels() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([{
            "id": 4, "name": "Bolt", "qty_available": 120.0,
        }]));
        transport.push_result(json!([
            {"location_id": [8, "WH/Stock"], "quantity": 100.0},
            {"location_id": [9, "WH2/Stock"], "quantity": 20.0},
        ]));
        let service = service_with(transport.clone());

        let (product, stock) = service.product_details(4).await.unwrap().unwrap();
        assert_eq!(product.qty_available, Some(120.0));
        assert_eq!(stock.len(), 2);
        assert_eq!(stock[0].location_id.as_ref().unwrap().display(), "WH/Stock");

        assert_eq!(
            transport.requests()[1].body["params"]["model"],
            "stock.quant"
        );
    }

    #[tokio::test]
    async fn missing_product_skips_stock_lookup() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([]));
        let service = service_with(transport.clone());

        assert!(service.product_details(999).await.unwrap().is_none());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn categories_sort_sequenced_first() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([
            {"id": 1, "name": "Zinc", "sequence_no": false},
            {"id": 2, "name": "Fasteners", "sequence_no": "2"},
            {"id": 3, "name": "Abrasives", "sequence_no": false},
            {"id": 4, "name": "Tools", "sequence_no": 1},
        ]));
        let service = service_with(transport);

        let categories = service.categories().await.unwrap();
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Tools", "Fasteners", "Abrasives", "Zinc"]);
    }

    #[tokio::test]
    async fn customer_search_matches_name_or_phone() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([]));
        let service = service_with(transport.clone());

        service
            .customers(Some("acme"), SearchReadOptions::limited(50))
            .await
            .unwrap();

        assert_eq!(
            transport.requests()[0].body["params"]["args"][0],
            json!(["|", ["name", "ilike", "acme"], ["phone", "ilike", "acme"]])
        );
    }

    #[tokio::test]
    async fn users_are_filtered_to_active() {
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!([{
            "id": 3, "name": "Jo", "login": "jo@example.com", "partner_id": [9, "Jo"],
        }]));
        let service = service_with(transport.clone());

        let users = service
            .users(Some("jo"), SearchReadOptions::limited(50))
            .await
            .unwrap();
        assert_eq!(users[0].login, "jo@example.com");

        assert_eq!(
            transport.requests()[0].body["params"]["args"][0],
            json!([["active", "=", true], ["name", "ilike", "jo"]])
        );
    }
}
