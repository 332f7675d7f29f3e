//! Generic synchronized collection store.
//!
//! One `CollectionStore<T>` per item type. Each operation resolves the acting
//! identity afresh, routes to the remote backend (authenticated) or the local
//! backend (guest), and publishes a change signal once the backend has
//! confirmed a mutation. Nothing is applied optimistically, so a failed write
//! leaves every observer on the last confirmed state.

use std::sync::Arc;

use tracing::instrument;

use marketplace_core::{CollectionItem, EntityKind, Identity, ProductId};

use crate::backend::BackendAdapter;
use crate::error::{CollectionError, Result};
use crate::identity::IdentityResolver;
use crate::notifier::{Notifier, Topic};

/// Cart or wishlist store. Cheap to clone; clones share state.
pub struct CollectionStore<T: CollectionItem> {
    inner: Arc<StoreInner<T>>,
}

struct StoreInner<T: CollectionItem> {
    resolver: IdentityResolver,
    remote: Arc<dyn BackendAdapter<T>>,
    local: Arc<dyn BackendAdapter<T>>,
    notifier: Notifier,
}

impl<T: CollectionItem> Clone for CollectionStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: CollectionItem> std::fmt::Debug for CollectionStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("kind", &T::KIND)
            .finish_non_exhaustive()
    }
}

impl<T: CollectionItem> CollectionStore<T> {
    /// Create a store.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Decides the acting identity for each operation
    /// * `remote` - Backend for authenticated identities
    /// * `local` - Backend for the guest
    /// * `notifier` - Receives a [`Topic::Collection`] signal after each confirmed mutation
    #[must_use]
    pub fn new(
        resolver: IdentityResolver,
        remote: Arc<dyn BackendAdapter<T>>,
        local: Arc<dyn BackendAdapter<T>>,
        notifier: Notifier,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                resolver,
                remote,
                local,
                notifier,
            }),
        }
    }

    /// The collection kind this store manages.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        T::KIND
    }

    /// The change topic of this store.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        Topic::Collection(T::KIND)
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Resolve the identity the next operation would act as.
    pub async fn identity(&self) -> Identity {
        self.inner.resolver.resolve().await
    }

    fn backend_for(&self, identity: &Identity) -> &dyn BackendAdapter<T> {
        match identity {
            Identity::Authenticated(_) => self.inner.remote.as_ref(),
            Identity::Guest => self.inner.local.as_ref(),
        }
    }

    /// Current items, or the failure that prevented reading them.
    ///
    /// # Errors
    ///
    /// Returns the backend error unchanged.
    #[instrument(skip(self), fields(kind = %T::KIND, identity = tracing::field::Empty))]
    pub async fn try_list(&self) -> Result<Vec<T>> {
        let identity = self.identity().await;
        tracing::Span::current().record("identity", tracing::field::display(&identity));
        self.backend_for(&identity).fetch(&identity).await
    }

    /// Current items. Never fails.
    ///
    /// Any failure is logged with its kind and yields an empty list, so a
    /// transient network error or corrupt local state degrades the view to
    /// "empty" instead of breaking it.
    pub async fn list(&self) -> Vec<T> {
        match self.try_list().await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(
                    kind = %T::KIND,
                    failure = %e.kind(),
                    error = %e,
                    "Failed to list collection, showing it as empty"
                );
                Vec::new()
            }
        }
    }

    /// Add `item`, merging with an existing entry of the same product.
    ///
    /// Cart entries accumulate quantity; wishlist entries are idempotent.
    /// Observers are notified only if the backend confirmed the write.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvalidItem`] for a non-finite price without
    /// touching the backend, otherwise the backend error. Either has already
    /// been logged.
    #[instrument(skip(self, item), fields(kind = %T::KIND, product_id = %item.id(), identity = tracing::field::Empty))]
    pub async fn add(&self, item: T) -> Result<()> {
        let identity = self.identity().await;
        tracing::Span::current().record("identity", tracing::field::display(&identity));

        if let Err(e) = item.product().validate() {
            let e = CollectionError::from(e);
            tracing::error!(failure = %e.kind(), error = %e, "Refusing to add item");
            return Err(e);
        }

        match self.backend_for(&identity).upsert(&identity, item).await {
            Ok(()) => {
                self.inner.notifier.notify(self.topic());
                Ok(())
            }
            Err(e) => {
                tracing::error!(failure = %e.kind(), error = %e, "Failed to add item");
                Err(e)
            }
        }
    }

    /// Remove the entry for `id`. Removing a missing entry succeeds.
    ///
    /// # Errors
    ///
    /// Returns the backend error; it has already been logged.
    #[instrument(skip(self), fields(kind = %T::KIND, product_id = %id, identity = tracing::field::Empty))]
    pub async fn remove(&self, id: &ProductId) -> Result<()> {
        let identity = self.identity().await;
        tracing::Span::current().record("identity", tracing::field::display(&identity));

        match self.backend_for(&identity).delete(&identity, id).await {
            Ok(()) => {
                self.inner.notifier.notify(self.topic());
                Ok(())
            }
            Err(e) => {
                tracing::error!(failure = %e.kind(), error = %e, "Failed to remove item");
                Err(e)
            }
        }
    }
}
