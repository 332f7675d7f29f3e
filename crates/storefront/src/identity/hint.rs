//! Persisted identity hint with an in-memory session cache.
//!
//! The last signed-in user is written to local storage so a later process (or
//! a page without a live session) can still act as that user. Reads go through
//! a `moka` cache so the stored blob is parsed at most once per refresh window;
//! the cache is invalidated on every sign-in, sign-out and
//! [`Topic::IdentityChanged`](crate::notifier::Topic::IdentityChanged) signal.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};

use marketplace_core::UserId;

use crate::error::CollectionError;
use crate::storage::KeyValueStorage;

/// Local storage key of the identity hint.
pub const IDENTITY_HINT_KEY: &str = "marketplace.identity";

/// Upper bound on how long a parsed hint is served from memory.
const CACHE_REFRESH: Duration = Duration::from_secs(60);

/// Stored form of the identity hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityHint {
    pub user_id: UserId,
    pub saved_at: DateTime<Utc>,
}

impl IdentityHint {
    /// Whether the hint is older than `ttl` at `now`.
    #[must_use]
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| self.saved_at.checked_add_signed(ttl))
            .is_some_and(|expires_at| expires_at <= now)
    }
}

/// Cached access to the identity hint.
#[derive(Clone)]
pub struct SessionCache {
    storage: Arc<dyn KeyValueStorage>,
    ttl: Duration,
    cache: Cache<String, Option<UserId>>,
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl SessionCache {
    /// Create a cache over `storage`; hints older than `ttl` are ignored.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(CACHE_REFRESH.min(ttl))
            .build();

        Self {
            storage,
            ttl,
            cache,
        }
    }

    /// The user named by a valid, unexpired hint.
    pub async fn load(&self) -> Option<UserId> {
        self.cache
            .get_with(IDENTITY_HINT_KEY.to_string(), self.read_hint())
            .await
    }

    /// Persist `user` as the identity hint.
    ///
    /// # Errors
    ///
    /// Returns an error if the hint cannot be encoded or written.
    pub async fn store(&self, user: &UserId) -> Result<(), CollectionError> {
        let hint = IdentityHint {
            user_id: user.clone(),
            saved_at: Utc::now(),
        };
        let raw = serde_json::to_string(&hint).map_err(CollectionError::Encode)?;
        let result = self.storage.set(IDENTITY_HINT_KEY, &raw).await;
        self.invalidate();
        result.map_err(CollectionError::from)
    }

    /// Remove the identity hint.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage cannot be written.
    pub async fn clear(&self) -> Result<(), CollectionError> {
        let result = self.storage.remove(IDENTITY_HINT_KEY).await;
        self.invalidate();
        result.map_err(CollectionError::from)
    }

    /// Drop the in-memory copy so the next [`load`](Self::load) re-reads storage.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }

    async fn read_hint(&self) -> Option<UserId> {
        let raw = match self.storage.get(IDENTITY_HINT_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read identity hint");
                return None;
            }
        };

        let hint: IdentityHint = match serde_json::from_str(&raw) {
            Ok(hint) => hint,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    failure = "malformed_local_state",
                    "Ignoring malformed identity hint"
                );
                return None;
            }
        };

        if hint.is_expired(self.ttl, Utc::now()) {
            tracing::debug!(user_id = %hint.user_id, "Identity hint expired");
            if let Err(e) = self.storage.remove(IDENTITY_HINT_KEY).await {
                tracing::warn!(error = %e, "Failed to remove expired identity hint");
            }
            return None;
        }

        Some(hint.user_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn cache(storage: &Arc<MemoryStorage>) -> SessionCache {
        SessionCache::new(
            Arc::clone(storage) as Arc<dyn KeyValueStorage>,
            Duration::from_secs(3600),
        )
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let storage = Arc::new(MemoryStorage::new());
        let hints = cache(&storage);

        assert_eq!(hints.load().await, None);
        hints.store(&user("u1")).await.unwrap();
        assert_eq!(hints.load().await, Some(user("u1")));

        hints.clear().await.unwrap();
        assert_eq!(hints.load().await, None);
    }

    #[tokio::test]
    async fn test_malformed_hint_is_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(IDENTITY_HINT_KEY, "{not json").await.unwrap();

        assert_eq!(cache(&storage).load().await, None);
    }

    #[tokio::test]
    async fn test_expired_hint_is_absent_and_removed() {
        let storage = Arc::new(MemoryStorage::new());
        let stale = IdentityHint {
            user_id: user("u1"),
            saved_at: Utc::now() - TimeDelta::hours(2),
        };
        storage
            .set(IDENTITY_HINT_KEY, &serde_json::to_string(&stale).unwrap())
            .await
            .unwrap();

        assert_eq!(cache(&storage).load().await, None);
        assert_eq!(storage.get(IDENTITY_HINT_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cached_until_invalidated() {
        let storage = Arc::new(MemoryStorage::new());
        let hints = cache(&storage);
        hints.store(&user("u1")).await.unwrap();
        // Let the invalidation timestamp fall strictly before the next insert.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(hints.load().await, Some(user("u1")));

        // Written behind the cache's back.
        let other = IdentityHint {
            user_id: user("u2"),
            saved_at: Utc::now(),
        };
        storage
            .set(IDENTITY_HINT_KEY, &serde_json::to_string(&other).unwrap())
            .await
            .unwrap();
        assert_eq!(hints.load().await, Some(user("u1")));

        hints.invalidate();
        assert_eq!(hints.load().await, Some(user("u2")));
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let hint = IdentityHint {
            user_id: user("u1"),
            saved_at: now - TimeDelta::seconds(10),
        };
        assert!(hint.is_expired(Duration::from_secs(5), now));
        assert!(!hint.is_expired(Duration::from_secs(60), now));
    }
}
