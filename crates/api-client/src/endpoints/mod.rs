//! Endpoint-specific API implementations
//!
//! Each module provides a typed interface for a set of backend routes.
//!
//! | Module | Routes | Description |
//! |--------|--------|-------------|
//! | `auth` | `/register`, `/login`, `/logout`, `/user` | Account session management |
//! | `listings` | `/listings`, `/listings/{id}` | Marketplace listings CRUD |
//!
//! Collection and item responses use the backend's resource envelopes,
//! [`Page`] and [`Single`].

pub mod auth;
pub mod listings;

pub use auth::AuthApi;
pub use listings::ListingsApi;

use serde::{Deserialize, Serialize};

/// Paginated collection envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub data: Vec<T>,
    /// Pagination details, absent for unpaginated collections
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageMeta {
    /// 1-based index of this page
    pub current_page: u64,
    /// Index of the final page
    pub last_page: u64,
    /// Page size used by the server
    pub per_page: u64,
    /// Items across all pages
    pub total: u64,
}

impl<T> Page<T> {
    /// Whether another page follows this one
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.meta
            .as_ref()
            .is_some_and(|meta| meta.current_page < meta.last_page)
    }
}

/// Single resource envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Single<T> {
    /// The resource
    pub data: T,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_page_without_meta() {
        let page: Page<Value> = serde_json::from_str(r#"{"data":[]}"#).unwrap();
        assert!(page.data.is_empty());
        assert!(!page.has_more());
    }

    #[test]
    fn test_page_has_more() {
        let page: Page<Value> = serde_json::from_str(
            r#"{"data":[1],"meta":{"current_page":1,"last_page":3,"per_page":1,"total":3}}"#,
        )
        .unwrap();
        assert!(page.has_more());
    }
}
