//! Generic resource read commands.
//!
//! `fieldops get products`, `fieldops get audits 42`, etc. Translates
//! resource names to the matching service call and prints JSON.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use fieldops_attendance::AttendanceService;
use fieldops_audit::AuditService;
use fieldops_catalog::{CatalogService, ProductQuery};
use fieldops_fleet::FleetService;
use fieldops_rpc::SearchReadOptions;
use fieldops_stock::StockService;

use super::{build_client, print_json};

/// Extra filters for list queries, fed from command-line flags.
#[derive(Debug, Default)]
pub struct ListFilters {
    pub search: Option<String>,
    pub date: Option<String>,
    pub vehicle: Option<i64>,
    pub company: Option<i64>,
    pub user: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListFilters {
    fn options(&self) -> SearchReadOptions {
        SearchReadOptions {
            limit: self.limit,
            offset: self.offset,
            order: None,
        }
    }
}

/// GET a resource (list or get by ID).
pub async fn get(
    resource: &str,
    id: Option<i64>,
    filters: &ListFilters,
    client_config_path: &Path,
) -> Result<()> {
    let client = build_client(client_config_path)?;
    let search = filters.search.as_deref();

    match resource.to_lowercase().as_str() {
        "product" | "products" => {
            let catalog = CatalogService::new(client);
            match id {
                Some(id) => {
                    let (product, stock) = catalog
                        .product_details(id)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("Product {} not found.", id))?;
                    print_json(&json!({ "product": product, "stock": stock }))?;
                }
                None => {
                    let products = catalog
                        .products(&ProductQuery {
                            search: filters.search.clone(),
                            category_id: None,
                            limit: filters.limit,
                            offset: filters.offset,
                        })
                        .await?;
                    print_json(&products)?;
                }
            }
        }
        "category" | "categories" => {
            print_json(&CatalogService::new(client).categories().await?)?;
        }
        "customer" | "customers" => {
            let customers = CatalogService::new(client)
                .customers(search, filters.options())
                .await?;
            print_json(&customers)?;
        }
        "user" | "users" => {
            let users = CatalogService::new(client)
                .users(search, filters.options())
                .await?;
            print_json(&users)?;
        }
        "trip" | "trips" => {
            let trips = FleetService::new(client)
                .trips(filters.date.as_deref(), filters.vehicle, filters.options())
                .await?;
            print_json(&trips)?;
        }
        "location" | "locations" => {
            print_json(&FleetService::new(client).locations(search).await?)?;
        }
        "purpose" | "purposes" => {
            print_json(&FleetService::new(client).visit_purposes().await?)?;
        }
        "employee" | "employees" => {
            let service = AttendanceService::new(client);
            match id {
                Some(id) => {
                    let employee = service
                        .employee(id)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("Employee {} not found.", id))?;
                    print_json(&employee)?;
                }
                None => print_json(&service.employees(search, filters.options()).await?)?,
            }
        }
        "staff-location" | "staff-locations" => {
            let service = FleetService::new(client);
            match filters.user {
                Some(uid) => match service.staff_location(uid).await? {
                    Some(location) => print_json(&location)?,
                    None => anyhow::bail!("No staff location for user {}.", uid),
                },
                None => print_json(&service.staff_locations().await?)?,
            }
        }
        "audit" | "audits" => {
            let audit = AuditService::new(client);
            match id {
                Some(id) => {
                    let details = audit
                        .audit_details(id)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("Audit {} not found.", id))?;
                    print_json(&details)?;
                }
                None => print_json(&audit.audits(filters.options()).await?)?,
            }
        }
        "stock-request" | "stock-requests" => {
            let stock = StockService::new(client);
            match id {
                Some(id) => {
                    let details = stock
                        .request_details(id)
                        .await?
                        .ok_or_else(|| anyhow::anyhow!("Stock request {} not found.", id))?;
                    print_json(&details)?;
                }
                None => print_json(&stock.requests(filters.company, filters.options()).await?)?,
            }
        }
        "wfh" => {
            let uid = filters
                .user
                .ok_or_else(|| anyhow::anyhow!("wfh requires --user <uid>."))?;
            print_json(&AttendanceService::new(client).wfh_requests(uid).await?)?;
        }
        _ => anyhow::bail!("Unknown resource type: {}", resource),
    }

    Ok(())
}

/// CREATE a resource from a JSON body.
pub async fn create(resource: &str, json_body: &str, client_config_path: &Path) -> Result<()> {
    let client = build_client(client_config_path)?;
    let body: serde_json::Value = serde_json::from_str(json_body)
        .map_err(|e| anyhow::anyhow!("Invalid JSON: {}", e))?;

    match resource.to_lowercase().as_str() {
        "trip" | "trips" => {
            let id = FleetService::new(client).save_trip(body).await?;
            println!("trip saved.");
            print_json(&json!({ "id": id }))?;
        }
        "stock-request" | "stock-requests" => {
            let request: fieldops_stock::NewStockRequest = serde_json::from_value(body)
                .map_err(|e| anyhow::anyhow!("Invalid stock request: {}", e))?;
            let id = StockService::new(client).create(&request).await?;
            println!("stock request created.");
            print_json(&json!({ "id": id }))?;
        }
        "audit" | "audits" => {
            let input: fieldops_audit::AuditInput = serde_json::from_value(body)
                .map_err(|e| anyhow::anyhow!("Invalid audit: {}", e))?;
            let id = AuditService::new(client).create(&input).await?;
            println!("audit created.");
            print_json(&json!({ "id": id }))?;
        }
        _ => anyhow::bail!("Unknown or read-only resource type: {}", resource),
    }

    Ok(())
}
