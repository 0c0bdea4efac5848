//! Login / logout commands.

use std::path::Path;

use anyhow::Result;

use crate::config::ClientConfig;

/// Login to the current context's server. Authenticates immediately so
/// a bad password fails here rather than on the first real command.
pub async fn login(username: &str, password: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let mut ctx = config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `fieldops use context <name>`."))?
        .clone();
    ctx.login = username.to_string();
    ctx.password = password.to_string();

    let client = super::client_for(&ctx)?;
    client
        .authenticate()
        .await
        .map_err(|e| anyhow::anyhow!("Login failed: {}", e))?;

    // Save credentials to the context.
    let name = ctx.name.clone();
    config.upsert_context(ctx);
    config.save(client_config_path)?;

    println!("Logged in as {}.", username);
    println!("Session saved to context \"{}\".", name);
    Ok(())
}

/// Logout — drop the stored session cookie and password.
pub fn logout(client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let current_name = config.current_context.clone();
    if current_name.is_empty() {
        anyhow::bail!("No current context.");
    }

    let ctx = config
        .get_mut(&current_name)
        .ok_or_else(|| anyhow::anyhow!("Current context not found."))?;
    ctx.password = String::new();
    config.save(client_config_path)?;

    let store = std::sync::Arc::new(fieldops_kv::RedbStore::open(&crate::config::store_path(
        &current_name,
    ))?);
    fieldops_rpc::SessionStore::new(store).clear()?;

    println!("Logged out from context \"{}\".", current_name);
    Ok(())
}
