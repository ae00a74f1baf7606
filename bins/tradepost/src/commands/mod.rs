//! CLI command implementations

pub mod auth;
pub mod listings;
pub mod request;
pub mod token;

use anyhow::Result;
use tradepost_api_client::{ApiClient, ClientConfig};
use tracing::debug;

/// Build a client from the environment
pub fn client() -> Result<ApiClient> {
    let config = ClientConfig::from_env()?;
    debug!(
        base_url = %config.base_url,
        environment = ?config.environment,
        session = tradepost_telemetry::session_id(),
        "Using API configuration"
    );
    Ok(ApiClient::with_config(config)?)
}
