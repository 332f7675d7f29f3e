//! Integration tests for the marketplace storefront and collections API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! Each test spawns its own collections API on an ephemeral local port, so
//! tests need no external services and never share server state.

use std::net::SocketAddr;
use std::sync::Arc;

use marketplace_api::config::ApiConfig;
use marketplace_api::state::AppState;
use marketplace_storefront::storage::{KeyValueStorage, MemoryStorage};
use marketplace_storefront::{AppContext, StorefrontConfig};
use tokio::task::JoinHandle;

/// A collections API running in the background of the current runtime.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind `127.0.0.1:0` and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let app = marketplace_api::app(AppState::new(ApiConfig::default()));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self { addr, handle }
    }

    /// Base URL of the server, without a trailing slash.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A fresh storefront context pointed at this server with empty local storage.
    ///
    /// # Panics
    ///
    /// Panics if the context cannot be built.
    #[must_use]
    pub fn context(&self) -> AppContext {
        self.context_with_storage(Arc::new(MemoryStorage::new()))
    }

    /// A storefront context pointed at this server sharing `storage`.
    ///
    /// # Panics
    ///
    /// Panics if the context cannot be built.
    #[must_use]
    pub fn context_with_storage(&self, storage: Arc<dyn KeyValueStorage>) -> AppContext {
        let config = StorefrontConfig::default()
            .with_api_url(&self.url())
            .expect("Test server URL is valid");
        AppContext::new(config, storage).expect("Failed to build storefront context")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
