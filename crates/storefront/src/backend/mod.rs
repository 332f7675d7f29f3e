//! Storage backends for collections.
//!
//! A [`CollectionStore`](crate::store::CollectionStore) talks to one of two
//! adapters depending on the resolved identity:
//!
//! - [`RemoteBackend`] - the collections API, for authenticated users
//! - [`LocalBackend`] - local persistent storage, for guests
//!
//! Both speak the same [`BackendAdapter`] interface so the store holds no
//! per-backend branching beyond picking one.

mod local;
mod remote;

use async_trait::async_trait;

use marketplace_core::{CollectionItem, Identity, ProductId};

use crate::error::Result;

pub use local::LocalBackend;
pub use remote::{RemoteBackend, http_client};

/// Fetch, upsert and delete items of one collection kind.
#[async_trait]
pub trait BackendAdapter<T: CollectionItem>: Send + Sync {
    /// Current items for `identity`, in insertion order.
    async fn fetch(&self, identity: &Identity) -> Result<Vec<T>>;

    /// Insert `item`, or merge it into the existing entry with the same ID.
    async fn upsert(&self, identity: &Identity, item: T) -> Result<()>;

    /// Delete the entry with `id`. Deleting a missing ID succeeds.
    async fn delete(&self, identity: &Identity, id: &ProductId) -> Result<()>;
}
