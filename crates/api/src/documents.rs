//! In-memory document store for collections.
//!
//! One document per user per kind, holding the items in insertion order.
//! Writers take the lock for the whole read-merge-write, so concurrent adds
//! from different clients never lose updates.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

use marketplace_core::{Collection, CollectionItem, ProductId, Upsert, UserId};

/// Collections of one kind, keyed by user.
#[derive(Debug)]
pub struct DocumentStore<T> {
    documents: RwLock<HashMap<UserId, Collection<T>>>,
}

impl<T> Default for DocumentStore<T> {
    fn default() -> Self {
        Self {
            documents: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: CollectionItem> DocumentStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Items of `user`; empty if the user has no document.
    pub async fn list(&self, user: &UserId) -> Vec<T> {
        self.documents
            .read()
            .await
            .get(user)
            .map(|doc| doc.items().to_vec())
            .unwrap_or_default()
    }

    /// Insert or merge `item` and return the resulting items.
    pub async fn upsert(&self, user: &UserId, item: T) -> (Upsert, Vec<T>) {
        let mut documents = self.documents.write().await;
        let doc = documents.entry(user.clone()).or_default();
        let outcome = doc.upsert(item, Utc::now());
        (outcome, doc.items().to_vec())
    }

    /// Remove `id` and return whether it was present plus the remaining items.
    pub async fn remove(&self, user: &UserId, id: &ProductId) -> (bool, Vec<T>) {
        let mut documents = self.documents.write().await;
        let Some(doc) = documents.get_mut(user) else {
            return (false, Vec::new());
        };
        let removed = doc.remove(id);
        let items = doc.items().to_vec();
        if doc.is_empty() {
            documents.remove(user);
        }
        (removed, items)
    }

    /// Number of users with a non-empty document.
    pub async fn user_count(&self) -> usize {
        self.documents.read().await.len()
    }
}
