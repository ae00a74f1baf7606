//! Raw request command

use super::client;
use crate::output::print_json;
use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::Value;
use tradepost_api_client::RequestOptions;

/// Send `method path` with an optional JSON body and print the response
pub async fn run(method: &str, path: &str, data: Option<&str>) -> Result<()> {
    let method = parse_method(method)?;

    let mut options = RequestOptions::new().method(method);
    if let Some(data) = data {
        let body: Value = serde_json::from_str(data).context("--data is not valid JSON")?;
        options = options.json(&body)?;
    }

    let client = client()?;
    let response: Value = client.request(path, options).await?;

    if !response.is_null() {
        print_json(&response)?;
    }
    Ok(())
}

fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {method}"))
}
