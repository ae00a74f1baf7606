//! Local session token management (no network)

use crate::output::{print_json, OutputFormat, Status};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::json;
use tradepost_api_client::session::TOKEN_KEY;
use tradepost_api_client::ClientConfig;
use tradepost_core::storage::{FileStore, KeyValueStore};
use tradepost_core::Error;

/// Open the session file the client would use
fn session_store() -> Result<FileStore> {
    let config = ClientConfig::from_env()?;
    let path = config.session_file.ok_or_else(Error::storage_unavailable)?;
    Ok(FileStore::new(path))
}

/// Print the stored token
pub fn show(format: OutputFormat) -> Result<()> {
    let store = session_store()?;
    let token = store
        .get(TOKEN_KEY)
        .map_err(|e| e.with_context("While reading the session token"))?
        .filter(|token| !token.is_empty());

    if format == OutputFormat::Json {
        return print_json(&json!({
            "token": token,
            "path": store.path().display().to_string(),
        }));
    }

    match token {
        Some(token) => println!("{token}"),
        None => Status::info("No session token stored"),
    }
    Ok(())
}

/// Store `value` as the session token
pub fn set(value: &str, format: OutputFormat) -> Result<()> {
    let value = value.trim();
    anyhow::ensure!(!value.is_empty(), "Token must not be empty");

    let store = session_store()?;
    store
        .set(TOKEN_KEY, value)
        .map_err(|e| e.with_context("While storing the session token"))?;

    if format == OutputFormat::Json {
        return print_json(&json!({ "stored": true, "path": store.path().display().to_string() }));
    }
    Status::success(&format!(
        "Token stored in {}",
        store.path().display().to_string().dimmed()
    ));
    Ok(())
}

/// Forget the session token
pub fn clear(format: OutputFormat) -> Result<()> {
    let store = session_store()?;
    let removed = store
        .remove(TOKEN_KEY)
        .map_err(|e| e.with_context("While removing the session token"))?;

    if format == OutputFormat::Json {
        return print_json(&json!({ "removed": removed }));
    }
    if removed {
        Status::success("Token removed");
    } else {
        Status::info("No session token stored");
    }
    Ok(())
}
