//! Locally saved form drafts, kept in the context's redb file.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use fieldops_kv::{DraftStore, RedbStore};

use crate::config::{self, ClientConfig};

fn drafts_for(client_config_path: &Path) -> Result<DraftStore> {
    let client_config = ClientConfig::load(client_config_path)?;
    let ctx = client_config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `fieldops use context <name>`."))?;
    let store = Arc::new(RedbStore::open(&config::store_path(&ctx.name))?);
    Ok(DraftStore::new(store))
}

pub fn list(client_config_path: &Path) -> Result<()> {
    let names = drafts_for(client_config_path)?.list()?;
    if names.is_empty() {
        println!("No drafts saved.");
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

pub fn show(name: &str, client_config_path: &Path) -> Result<()> {
    let draft: Option<serde_json::Value> = drafts_for(client_config_path)?.load(name)?;
    match draft {
        Some(value) => super::print_json(&value),
        None => anyhow::bail!("No draft named \"{}\".", name),
    }
}

pub fn discard(name: &str, client_config_path: &Path) -> Result<()> {
    drafts_for(client_config_path)?.discard(name)?;
    println!("Draft \"{}\" discarded.", name);
    Ok(())
}
