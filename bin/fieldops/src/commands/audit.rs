//! Audit commands beyond the generic get/create.

use std::path::Path;

use anyhow::Result;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use fieldops_audit::AuditService;
use fieldops_core::{OdooId, media};

use super::{build_client, print_json};

pub async fn set_state(audit_id: OdooId, state: &str, client_config_path: &Path) -> Result<()> {
    let service = AuditService::new(build_client(client_config_path)?);
    service.set_state(audit_id, state).await?;
    println!("Audit {} moved to \"{}\".", audit_id, state);
    Ok(())
}

/// Upload local files as voucher attachments on an audit.
pub async fn attach(audit_id: OdooId, files: &[String], client_config_path: &Path) -> Result<()> {
    let service = AuditService::new(build_client(client_config_path)?);

    let mut payloads = Vec::with_capacity(files.len());
    for path in files {
        let bytes = std::fs::read(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path, e))?;
        let mime = media::mime_for_path(path);
        payloads.push(format!("data:{};base64,{}", mime, BASE64.encode(bytes)));
    }

    let outcome = service.upload_attachments(audit_id, &payloads).await?;
    println!("Uploaded {} attachment(s).", outcome.ids.len());
    for error in &outcome.errors {
        eprintln!("warning: {}", error);
    }
    Ok(())
}

/// List attachment metadata for an audit.
pub async fn attachments(audit_id: OdooId, client_config_path: &Path) -> Result<()> {
    let service = AuditService::new(build_client(client_config_path)?);
    print_json(&service.attachments(audit_id).await?)?;
    Ok(())
}
