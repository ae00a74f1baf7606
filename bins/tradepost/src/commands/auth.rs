//! Account commands: login, register, logout, whoami

use super::client;
use crate::output::{print_json, OutputFormat, Status};
use anyhow::Result;
use owo_colors::OwoColorize;
use tradepost_api_client::endpoints::auth::{AuthResponse, LoginRequest, RegisterRequest, User};

/// Sign in and persist the token
pub async fn login(email: &str, password: &str, format: OutputFormat) -> Result<()> {
    let client = client()?;
    let response = client
        .auth()
        .login(&LoginRequest::new(email, password))
        .await?;
    print_signed_in(&response, email, format)
}

/// Create an account, then behave like `login`
pub async fn register(name: &str, email: &str, password: &str, format: OutputFormat) -> Result<()> {
    let client = client()?;
    let response = client
        .auth()
        .register(&RegisterRequest::new(name, email, password))
        .await?;
    print_signed_in(&response, email, format)
}

/// Revoke the session server-side; the local token is gone either way
pub async fn logout(format: OutputFormat) -> Result<()> {
    let client = client()?;

    if !client.is_authenticated() {
        if format == OutputFormat::Json {
            return print_json(&serde_json::json!({ "signed_out": true }));
        }
        Status::info("Not signed in");
        return Ok(());
    }

    client.auth().logout().await?;

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "signed_out": true }));
    }
    Status::success("Signed out");
    Ok(())
}

/// Show the account behind the stored token
pub async fn whoami(format: OutputFormat) -> Result<()> {
    let client = client()?;
    let user = client.auth().user().await?;

    if format == OutputFormat::Json {
        return print_json(&user);
    }
    print_user(&user);
    Ok(())
}

fn print_signed_in(response: &AuthResponse, email: &str, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(&response.user);
    }

    let who = response
        .user
        .as_ref()
        .map_or(email, |user| user.name.as_str());
    Status::success(&format!("Signed in as {}", who.cyan()));
    Ok(())
}

fn print_user(user: &User) {
    Status::header(&user.name);
    println!("  {:<10} {}", "ID".dimmed(), user.id);
    println!("  {:<10} {}", "Email".dimmed(), user.email);
    let verified = if user.email_verified_at.is_some() {
        "yes".green().to_string()
    } else {
        "no".yellow().to_string()
    };
    println!("  {:<10} {}", "Verified".dimmed(), verified);
    if let Some(ref created_at) = user.created_at {
        println!("  {:<10} {}", "Joined".dimmed(), created_at);
    }
}
