//! Stock request commands beyond the generic get/create.

use std::path::Path;

use anyhow::Result;

use fieldops_core::OdooId;
use fieldops_stock::{StockRequestPatch, StockService};

use super::{build_client, print_json};

/// Run a workflow action like `action_approve` or `action_reject`.
pub async fn action(
    request_id: OdooId,
    action: &str,
    company_id: Option<OdooId>,
    client_config_path: &Path,
) -> Result<()> {
    let service = StockService::new(build_client(client_config_path)?);
    let result = service.action(request_id, action, company_id).await?;
    println!("Ran {} on stock request {}.", action, request_id);
    if !result.is_null() {
        print_json(&result)?;
    }
    Ok(())
}

/// Patch editable fields on a request.
pub async fn update(
    request_id: OdooId,
    patch: &StockRequestPatch,
    client_config_path: &Path,
) -> Result<()> {
    let service = StockService::new(build_client(client_config_path)?);
    service.update(request_id, patch).await?;
    println!("Stock request {} updated.", request_id);
    Ok(())
}
