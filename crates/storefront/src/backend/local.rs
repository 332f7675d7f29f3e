//! Guest collections in local persistent storage.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::instrument;

use marketplace_core::{Collection, CollectionItem, Identity, ProductId};

use super::BackendAdapter;
use crate::error::{CollectionError, Result};
use crate::storage::KeyValueStorage;

/// Stores the whole collection as one JSON array under the kind's fixed key.
///
/// Mutations are read-modify-write on that array, serialized through a single
/// writer lock so concurrent adds and removes never lose updates. Create one
/// `LocalBackend` per kind and share it.
pub struct LocalBackend<T> {
    storage: Arc<dyn KeyValueStorage>,
    writer: Mutex<()>,
    _item: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for LocalBackend<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBackend").finish_non_exhaustive()
    }
}

impl<T: CollectionItem> LocalBackend<T> {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            writer: Mutex::new(()),
            _item: PhantomData,
        }
    }

    const fn key() -> &'static str {
        T::KIND.storage_key()
    }

    /// Read the stored collection. Absent means empty.
    async fn read(&self) -> Result<Collection<T>> {
        let Some(raw) = self.storage.get(Self::key()).await? else {
            return Ok(Collection::default());
        };
        let items: Vec<T> =
            serde_json::from_str(&raw).map_err(|source| CollectionError::MalformedLocalState {
                key: Self::key().to_string(),
                source,
            })?;
        Ok(Collection::from_items(items))
    }

    /// Read for mutation: malformed state is discarded and rebuilt.
    async fn read_for_write(&self) -> Result<Collection<T>> {
        match self.read().await {
            Err(e @ CollectionError::MalformedLocalState { .. }) => {
                tracing::warn!(
                    error = %e,
                    failure = %e.kind(),
                    "Discarding malformed guest collection"
                );
                Ok(Collection::default())
            }
            other => other,
        }
    }

    async fn write(&self, collection: &Collection<T>) -> Result<()> {
        let raw = serde_json::to_string(collection).map_err(CollectionError::Encode)?;
        self.storage.set(Self::key(), &raw).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: CollectionItem> BackendAdapter<T> for LocalBackend<T> {
    async fn fetch(&self, _identity: &Identity) -> Result<Vec<T>> {
        Ok(self.read().await?.into_items())
    }

    #[instrument(skip(self, _identity, item), fields(kind = %T::KIND, product_id = %item.id()))]
    async fn upsert(&self, _identity: &Identity, item: T) -> Result<()> {
        let _guard = self.writer.lock().await;
        let mut collection = self.read_for_write().await?;
        let outcome = collection.upsert(item, Utc::now());
        self.write(&collection).await?;
        tracing::debug!(?outcome, items = collection.len(), "Guest collection updated");
        Ok(())
    }

    #[instrument(skip(self, _identity), fields(kind = %T::KIND, product_id = %id))]
    async fn delete(&self, _identity: &Identity, id: &ProductId) -> Result<()> {
        let _guard = self.writer.lock().await;
        let mut collection = self.read_for_write().await?;
        if collection.remove(id) {
            self.write(&collection).await?;
        }
        Ok(())
    }
}
