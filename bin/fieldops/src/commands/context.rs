//! Context management commands.

use std::path::Path;

use anyhow::Result;

use crate::config::{ClientConfig, Context};

/// Create a new context and make it current if none is set.
pub fn create(
    name: &str,
    server: Option<&str>,
    db: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    config.upsert_context(Context {
        name: name.to_string(),
        server: server.unwrap_or_default().to_string(),
        db: db.unwrap_or_default().to_string(),
        login: String::new(),
        password: String::new(),
    });
    if config.current_context.is_empty() {
        config.current_context = name.to_string();
    }
    config.save(client_config_path)?;

    println!("Context \"{}\" created.", name);
    Ok(())
}

/// List all contexts.
pub fn list(client_config_path: &Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: fieldops context create <name> --server <url> --db <name>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:16}", "", "NAME", "SERVER", "DB");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context {
            "*"
        } else {
            " "
        };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        let db = if ctx.db.is_empty() { "-" } else { &ctx.db };
        println!("{:2} {:20} {:40} {:16}", marker, ctx.name, server, db);
    }

    Ok(())
}

/// Switch current context.
pub fn use_context(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{}\" not found. Run `fieldops context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

/// Set properties on a context.
pub fn set(
    name: &str,
    server: Option<&str>,
    db: Option<&str>,
    client_config_path: &Path,
) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    let ctx = config
        .get_mut(name)
        .ok_or_else(|| anyhow::anyhow!("Context \"{}\" not found.", name))?;

    if let Some(s) = server {
        ctx.server = s.to_string();
    }
    if let Some(d) = db {
        ctx.db = d.to_string();
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" updated.", name);
    Ok(())
}

/// Delete a context (leaves its local database file in place).
pub fn delete(name: &str, client_config_path: &Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}
