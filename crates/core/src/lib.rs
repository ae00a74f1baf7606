//! Core utilities shared by Tradepost tools
//!
//! This crate provides the pieces every other crate in the workspace leans on:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Durable storage**: A small key/value store that survives process restarts
//!
//! # Example
//!
//! ```rust,no_run
//! use tradepost_core::storage::{FileStore, KeyValueStore};
//!
//! let store = FileStore::open_default().expect("No data directory available");
//! store.set("auth_token", "secret").expect("Failed to persist token");
//! assert_eq!(store.get("auth_token").unwrap().as_deref(), Some("secret"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod storage;

pub use error::{Error, ErrorCode, ErrorReport, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::storage::{FileStore, KeyValueStore, MemoryStore};
}
