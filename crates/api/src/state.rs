//! Application state shared across handlers.

use std::sync::Arc;

use marketplace_core::{CartItem, WishlistItem};

use crate::config::ApiConfig;
use crate::documents::DocumentStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the per-kind document stores.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    carts: DocumentStore<CartItem>,
    wishlists: DocumentStore<WishlistItem>,
}

impl AppState {
    /// Create a new application state with empty collections.
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                carts: DocumentStore::new(),
                wishlists: DocumentStore::new(),
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Cart documents.
    #[must_use]
    pub fn carts(&self) -> &DocumentStore<CartItem> {
        &self.inner.carts
    }

    /// Wishlist documents.
    #[must_use]
    pub fn wishlists(&self) -> &DocumentStore<WishlistItem> {
        &self.inner.wishlists
    }
}
