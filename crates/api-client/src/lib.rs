//! Typed API client for the Tradepost marketplace backend
//!
//! This crate provides a small, strongly-typed HTTP client for the account
//! trading backend.
//!
//! # Features
//!
//! - **Environment-based configuration**: Load the base URL and timeout from environment variables
//! - **Persistent session**: The bearer token survives restarts via durable storage
//! - **Hard timeouts**: Requests that exceed the deadline are aborted and reported as `408`
//! - **Classified errors**: Validation (`422`), generic API, timeout and network failures are distinct variants
//! - **Request correlation**: Every request carries a unique ID for debugging
//!
//! The client never retries; retry policy belongs to the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use tradepost_api_client::{ApiClient, ApiError};
//! use tradepost_api_client::endpoints::listings::ListingQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new()?;
//!
//!     match client.listings().list(&ListingQuery::new().with_game("Valorant")).await {
//!         Ok(page) => println!("{} listings", page.data.len()),
//!         Err(ApiError::Validation { message, .. }) => eprintln!("Invalid filters: {message}"),
//!         Err(e) if e.is_timeout() => eprintln!("Backend is slow, try again"),
//!         Err(e) => return Err(e.into()),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod options;
pub mod session;

pub use client::ApiClient;
pub use config::{ClientConfig, Environment, DEFAULT_TIMEOUT};
pub use error::{ApiError, ApiResult};
pub use options::RequestOptions;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::client::ApiClient;
    pub use crate::config::{ClientConfig, Environment};
    pub use crate::endpoints::{AuthApi, ListingsApi, Page, Single};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::options::RequestOptions;
}
