//! Authentication endpoints
//!
//! Successful `register`/`login` calls store the returned bearer token on the
//! client, so every later request is authenticated automatically.

use crate::client::ApiClient;
use crate::error::ApiResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::debug;

/// Authentication API interface
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    /// Create a new auth API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create an account and sign in
    ///
    /// POST /register
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<AuthResponse> {
        let response: AuthResponse = self.client.post("/register", Some(request)).await?;
        self.client.set_token(Some(response.token.clone()));
        Ok(response)
    }

    /// Sign in with email and password
    ///
    /// POST /login
    pub async fn login(&self, request: &LoginRequest) -> ApiResult<AuthResponse> {
        let response: AuthResponse = self.client.post("/login", Some(request)).await?;
        self.client.set_token(Some(response.token.clone()));
        Ok(response)
    }

    /// Revoke the token server-side and forget it locally
    ///
    /// POST /logout. The local token is cleared even when the server call
    /// fails; the server's result is still returned.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self.client.post::<Value, ()>("/logout", None).await;
        self.client.clear_token();
        if let Err(e) = &result {
            debug!(error = %e, "Server-side logout failed, local session cleared anyway");
        }
        result.map(|_| ())
    }

    /// Currently authenticated user
    ///
    /// GET /user
    pub async fn user(&self) -> ApiResult<User> {
        self.client.get("/user").await
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration payload
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
    /// Must equal `password`
    pub password_confirmation: String,
}

impl RegisterRequest {
    /// Build a request whose confirmation matches the password
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            name: name.into(),
            email: email.into(),
            password_confirmation: password.clone(),
            password,
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Login payload
#[derive(Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plain-text password
    pub password: String,
}

impl LoginRequest {
    /// Build a login request
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Token issued by `register`/`login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for later requests
    #[serde(alias = "access_token")]
    pub token: String,
    /// Account the token belongs to
    #[serde(default)]
    pub user: Option<User>,
}

/// Marketplace account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: u64,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Set once the email address is confirmed
    #[serde(default)]
    pub email_verified_at: Option<String>,
    /// Server timestamp, as sent
    #[serde(default)]
    pub created_at: Option<String>,
}
