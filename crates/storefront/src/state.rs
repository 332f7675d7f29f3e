//! Application context wiring the collection components together.

use std::sync::Arc;

use marketplace_core::{CartItem, WishlistItem};

use crate::backend::{BackendAdapter, LocalBackend, RemoteBackend, http_client};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::identity::{AuthSession, IdentityResolver, SessionCache, SessionProvider};
use crate::notifier::{Notifier, Subscription, Topic};
use crate::storage::KeyValueStorage;
use crate::store::CollectionStore;

/// Everything a view needs: the two stores, the session and the notifier.
///
/// This struct is cheaply cloneable via `Arc`. There is one notifier per
/// context; contexts never share signals.
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

struct AppContextInner {
    config: StorefrontConfig,
    notifier: Notifier,
    session: Arc<AuthSession>,
    resolver: IdentityResolver,
    cart: CollectionStore<CartItem>,
    wishlist: CollectionStore<WishlistItem>,
    _hint_invalidation: Subscription,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.inner.config)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

/// Remote backends for both collection kinds.
pub struct RemoteBackends {
    pub cart: Arc<dyn BackendAdapter<CartItem>>,
    pub wishlist: Arc<dyn BackendAdapter<WishlistItem>>,
}

impl RemoteBackends {
    /// HTTP backends against the configured collections API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn http(config: &StorefrontConfig) -> Result<Self> {
        let client = http_client(config)?;
        Ok(Self {
            cart: Arc::new(RemoteBackend::new(client.clone(), config)),
            wishlist: Arc::new(RemoteBackend::new(client, config)),
        })
    }
}

impl AppContext {
    /// Create a context talking to the configured collections API.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `storage` - Local persistent storage for guest collections and the identity hint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let remotes = RemoteBackends::http(&config)?;
        Ok(Self::with_remotes(config, storage, remotes))
    }

    /// Create a context with caller-supplied remote backends.
    #[must_use]
    pub fn with_remotes(
        config: StorefrontConfig,
        storage: Arc<dyn KeyValueStorage>,
        remotes: RemoteBackends,
    ) -> Self {
        let notifier = Notifier::new();
        let hints = SessionCache::new(Arc::clone(&storage), config.identity_hint_ttl);

        let invalidated = hints.clone();
        let hint_invalidation = notifier.subscribe(Topic::IdentityChanged, move |_| {
            invalidated.invalidate();
        });

        let session = Arc::new(AuthSession::new(hints.clone(), notifier.clone()));
        let resolver = IdentityResolver::new(
            Arc::clone(&session) as Arc<dyn SessionProvider>,
            hints,
        );

        let cart = CollectionStore::new(
            resolver.clone(),
            remotes.cart,
            Arc::new(LocalBackend::new(Arc::clone(&storage))),
            notifier.clone(),
        );
        let wishlist = CollectionStore::new(
            resolver.clone(),
            remotes.wishlist,
            Arc::new(LocalBackend::new(storage)),
            notifier.clone(),
        );

        tracing::debug!(api_url = %config.api_url, "Application context created");

        Self {
            inner: Arc::new(AppContextInner {
                config,
                notifier,
                session,
                resolver,
                cart,
                wishlist,
                _hint_invalidation: hint_invalidation,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// The in-process authenticated session.
    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.inner.session
    }

    #[must_use]
    pub fn resolver(&self) -> &IdentityResolver {
        &self.inner.resolver
    }

    #[must_use]
    pub fn cart(&self) -> &CollectionStore<CartItem> {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &CollectionStore<WishlistItem> {
        &self.inner.wishlist
    }
}
