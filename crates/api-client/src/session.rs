//! Session token held by the client
//!
//! The in-memory value is the source of truth for the running process. Every
//! change is mirrored into a [`KeyValueStore`] on a best-effort basis so the
//! session survives restarts; storage failures are logged and otherwise
//! ignored.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;
use tradepost_core::storage::KeyValueStore;

/// Storage key the bearer token is persisted under
pub const TOKEN_KEY: &str = "auth_token";

/// Bearer token plus its durable mirror
pub struct Session {
    token: RwLock<Option<String>>,
    store: Arc<dyn KeyValueStore>,
}

impl Session {
    /// Seed the in-memory token from storage. Never fails: an unreadable
    /// store just means starting signed out.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let token = match store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                debug!(error = %e, "Session storage unreadable, starting without a token");
                None
            }
        };

        debug!(authenticated = token.is_some(), "Session restored");

        Self {
            token: RwLock::new(token),
            store,
        }
    }

    /// Current token, if any
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a token is present
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the token. `None` (or an empty string) signs out and removes
    /// the persisted copy.
    pub fn set_token(&self, token: Option<String>) {
        let token = token.filter(|t| !t.is_empty());

        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token.clone();

        let persisted = match &token {
            Some(value) => self.store.set(TOKEN_KEY, value),
            None => self.store.remove(TOKEN_KEY).map(|_| ()),
        };

        if let Err(e) = persisted {
            debug!(error = %e, "Failed to persist session token");
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
