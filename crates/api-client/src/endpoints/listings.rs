//! Marketplace listing endpoints
//!
//! Maps to the backend's `/listings` resource:
//! - List listings with filters and pagination
//! - Get a single listing by ID
//! - Create, update and delete the caller's own listings

use super::{Page, Single};
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::options::RequestOptions;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Listings API interface
#[derive(Clone)]
pub struct ListingsApi {
    client: ApiClient,
}

impl ListingsApi {
    /// Create a new listings API interface
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List listings with filters and pagination
    ///
    /// GET /listings
    pub async fn list(&self, query: &ListingQuery) -> ApiResult<Page<Listing>> {
        self.client.get_with("/listings", query.to_options()).await
    }

    /// Get a single listing by ID
    ///
    /// GET /listings/{id}
    pub async fn get(&self, id: u64) -> ApiResult<Single<Listing>> {
        self.client.get(&format!("/listings/{id}")).await
    }

    /// Create a new listing
    ///
    /// POST /listings
    pub async fn create(&self, listing: &NewListing) -> ApiResult<Single<Listing>> {
        self.client.post("/listings", Some(listing)).await
    }

    /// Update an existing listing
    ///
    /// PUT /listings/{id}
    pub async fn update(&self, id: u64, changes: &ListingUpdate) -> ApiResult<Single<Listing>> {
        self.client.put(&format!("/listings/{id}"), Some(changes)).await
    }

    /// Delete a listing
    ///
    /// DELETE /listings/{id}
    pub async fn delete(&self, id: u64) -> ApiResult<()> {
        self.client
            .delete::<Option<Value>>(&format!("/listings/{id}"))
            .await
            .map(|_| ())
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Filters for listing listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Listings per page
    pub per_page: Option<u32>,
    /// Free-text search over title and description
    pub search: Option<String>,
    /// Game the account belongs to
    pub game: Option<String>,
    /// Platform (e.g. `pc`, `ps5`)
    pub platform: Option<String>,
    /// Lowest price, inclusive
    pub min_price: Option<f64>,
    /// Highest price, inclusive
    pub max_price: Option<f64>,
    /// Sort key, e.g. `price`, `-created_at`
    pub sort: Option<String>,
}

impl ListingQuery {
    /// Create new params with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page number (1-based)
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set page size
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Free-text search
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Filter by game
    #[must_use]
    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }

    /// Filter by price range
    #[must_use]
    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    /// Query string pairs, only for filters that are set
    pub(crate) fn to_options(&self) -> RequestOptions {
        let mut options = RequestOptions::new();

        if let Some(page) = self.page {
            options = options.query("page", page);
        }
        if let Some(per_page) = self.per_page {
            options = options.query("per_page", per_page);
        }
        if let Some(ref search) = self.search {
            options = options.query("search", search);
        }
        if let Some(ref game) = self.game {
            options = options.query("game", game);
        }
        if let Some(ref platform) = self.platform {
            options = options.query("platform", platform);
        }
        if let Some(min_price) = self.min_price {
            options = options.query("min_price", min_price);
        }
        if let Some(max_price) = self.max_price {
            options = options.query("max_price", max_price);
        }
        if let Some(ref sort) = self.sort {
            options = options.query("sort", sort);
        }

        options
    }
}

/// Account listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Listing ID
    pub id: u64,
    /// Headline shown in search results
    pub title: String,
    /// Long-form description
    #[serde(default)]
    pub description: Option<String>,
    /// Game the account belongs to
    #[serde(default)]
    pub game: Option<String>,
    /// Platform the account is on
    #[serde(default)]
    pub platform: Option<String>,
    /// Asking price. The backend serializes decimals as strings.
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    /// ISO 4217 currency code
    #[serde(default)]
    pub currency: Option<String>,
    /// e.g. `active`, `reserved`, `sold`
    #[serde(default)]
    pub status: Option<String>,
    /// Public profile of the seller
    #[serde(default)]
    pub seller: Option<Seller>,
    /// Server timestamp, as sent
    #[serde(default)]
    pub created_at: Option<String>,
    /// Server timestamp, as sent
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Public seller profile embedded in a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    /// User ID
    pub id: u64,
    /// Display name
    pub name: String,
    /// Average review score (0-5)
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Create listing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    /// Headline
    pub title: String,
    /// Long-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Game the account belongs to
    pub game: String,
    /// Platform the account is on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Asking price
    pub price: f64,
}

/// Update listing request. Only present fields are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingUpdate {
    /// New headline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New asking price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// New status, e.g. `reserved`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("price out of range")),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected price as number or string, got {other}"
        ))),
    }
}
