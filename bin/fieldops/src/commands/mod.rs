pub mod attendance;
pub mod audit;
pub mod context;
pub mod draft;
pub mod login;
pub mod resource;
pub mod stock;
pub mod trip;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use fieldops_kv::RedbStore;
use fieldops_rpc::{OdooClient, OdooConfig};

use crate::config::{self, ClientConfig, Context};

/// Build an RPC client for the current context. The session cookie
/// lives in the context's redb file, so an already-authenticated
/// context needs no fresh login.
pub(crate) fn build_client(client_config_path: &Path) -> Result<Arc<OdooClient>> {
    let config = ClientConfig::load(client_config_path)?;
    let ctx = config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `fieldops use context <name>`."))?;
    client_for(ctx)
}

pub(crate) fn client_for(ctx: &Context) -> Result<Arc<OdooClient>> {
    if ctx.server.is_empty() {
        anyhow::bail!(
            "No server URL set for context \"{}\". Run `fieldops context set {} --server <url>`.",
            ctx.name,
            ctx.name
        );
    }
    if ctx.db.is_empty() {
        anyhow::bail!(
            "No database set for context \"{}\". Run `fieldops context set {} --db <name>`.",
            ctx.name,
            ctx.name
        );
    }
    if ctx.login.is_empty() {
        anyhow::bail!("Not logged in. Run `fieldops login`.");
    }

    let store = Arc::new(RedbStore::open(&config::store_path(&ctx.name))?);
    let odoo = OdooConfig::new(&ctx.server, &ctx.db, &ctx.login, &ctx.password);
    Ok(Arc::new(OdooClient::connect(odoo, store)?))
}

/// Print a serializable value as pretty JSON.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
