//! Listener registration for view components.
//!
//! A view registers a callback with a [`CollectionStore`] and receives the
//! full item list: once immediately, then again after every change signal for
//! that collection and every identity change. The callback only ever sees
//! snapshots in signal order; a refresh that finishes after a newer one has
//! already been delivered is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::runtime::Handle;
use tokio::sync::Mutex;

use marketplace_core::CollectionItem;

use crate::notifier::{Subscription, Topic};
use crate::store::CollectionStore;

/// Live listener registration. Dropping it unregisters.
///
/// After [`unregister`](Self::unregister) (or drop) returns, the callback is
/// never invoked again, including for refreshes already in flight.
#[must_use = "dropping a Registration unregisters the listener"]
pub struct Registration {
    subscriptions: Vec<Subscription>,
    active: Arc<AtomicBool>,
}

impl Registration {
    /// Stop receiving snapshots.
    pub fn unregister(self) {
        drop(self);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("subscriptions", &self.subscriptions)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
    }
}

struct Listener<T: CollectionItem, F> {
    store: CollectionStore<T>,
    on_snapshot: F,
    active: Arc<AtomicBool>,
    issued: AtomicU64,
    delivered: Mutex<u64>,
}

impl<T, F> Listener<T, F>
where
    T: CollectionItem,
    F: Fn(Vec<T>) + Send + Sync + 'static,
{
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn refresh(&self, seq: u64) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }

        let items = self.store.list().await;

        let mut delivered = self.delivered.lock().await;
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        if seq <= *delivered {
            tracing::trace!(kind = %T::KIND, seq, latest = *delivered, "Dropping stale snapshot");
            return;
        }
        *delivered = seq;
        (self.on_snapshot)(items);
    }
}

impl<T: CollectionItem> CollectionStore<T> {
    /// Register `on_snapshot` and deliver the current list before returning.
    ///
    /// Subsequent snapshots are fetched on the Tokio runtime this was called
    /// from whenever the collection or the identity changes.
    ///
    /// `on_snapshot` runs on a runtime worker, one call at a time, and should
    /// return quickly; hand heavy work off to a channel or a spawned task.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub async fn register<F>(&self, on_snapshot: F) -> Registration
    where
        F: Fn(Vec<T>) + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let listener = Arc::new(Listener {
            store: self.clone(),
            on_snapshot,
            active: Arc::clone(&active),
            issued: AtomicU64::new(0),
            delivered: Mutex::new(0),
        });
        let runtime = Handle::current();

        // Subscribe before the first read so a change racing it is not missed.
        let subscriptions = [self.topic(), Topic::IdentityChanged]
            .into_iter()
            .map(|topic| {
                let listener = Arc::clone(&listener);
                let runtime = runtime.clone();
                self.notifier().subscribe(topic, move |_| {
                    let seq = listener.issue();
                    let listener = Arc::clone(&listener);
                    runtime.spawn(async move { listener.refresh(seq).await });
                })
            })
            .collect();

        let seq = listener.issue();
        listener.refresh(seq).await;

        tracing::debug!(kind = %T::KIND, "Listener registered");
        Registration {
            subscriptions,
            active,
        }
    }
}
