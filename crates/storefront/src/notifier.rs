//! In-process change notifier.
//!
//! A registry from [`Topic`] to handlers, owned by the application context
//! rather than living in a global. Signals carry no payload: a handler that
//! cares about the new state re-reads it.
//!
//! Dispatch is synchronous and runs handlers in registration order. The
//! handler list is snapshotted before dispatch, so handlers may subscribe or
//! unsubscribe while being called.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use marketplace_core::EntityKind;
use parking_lot::Mutex;

/// A broadcast channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// The collection of the given kind changed.
    Collection(EntityKind),
    /// The acting identity changed (sign-in or sign-out).
    IdentityChanged,
}

type Handler = Arc<dyn Fn(Topic) + Send + Sync>;

/// Publish/subscribe registry. Cheap to clone; clones share handlers.
#[derive(Clone, Default)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

#[derive(Default)]
struct NotifierInner {
    handlers: Mutex<HashMap<Topic, Vec<(u64, Handler)>>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.inner.handlers.lock();
        let counts: HashMap<_, _> = handlers.iter().map(|(t, h)| (*t, h.len())).collect();
        f.debug_struct("Notifier").field("handlers", &counts).finish()
    }
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(Topic) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .handlers
            .lock()
            .entry(topic)
            .or_default()
            .push((id, Arc::new(handler)));

        tracing::trace!(?topic, subscription_id = id, "subscribed");

        Subscription {
            notifier: Arc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Signal every handler registered for `topic`.
    ///
    /// Returns the number of handlers called.
    pub fn notify(&self, topic: Topic) -> usize {
        let snapshot: Vec<Handler> = self
            .inner
            .handlers
            .lock()
            .get(&topic)
            .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        tracing::debug!(?topic, handlers = snapshot.len(), "notify");

        for handler in &snapshot {
            handler(topic);
        }
        snapshot.len()
    }

    /// Number of handlers currently registered for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner.handlers.lock().get(&topic).map_or(0, Vec::len)
    }
}

impl NotifierInner {
    fn remove(&self, topic: Topic, id: u64) {
        let mut handlers = self.handlers.lock();
        if let Some(list) = handlers.get_mut(&topic) {
            list.retain(|(handler_id, _)| *handler_id != id);
            if list.is_empty() {
                handlers.remove(&topic);
            }
        }
    }
}

/// Handle to a registered handler. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    notifier: Weak<NotifierInner>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    /// Remove the handler.
    pub fn unsubscribe(self) {
        drop(self);
    }

    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.notifier.upgrade() {
            inner.remove(self.topic, self.id);
            tracing::trace!(topic = ?self.topic, subscription_id = self.id, "unsubscribed");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    const CART: Topic = Topic::Collection(EntityKind::Cart);
    const WISHLIST: Topic = Topic::Collection(EntityKind::Wishlist);

    fn counter() -> (Arc<AtomicUsize>, impl Fn(Topic) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&count);
        (count, move |_| {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_notify_reaches_only_matching_topic() {
        let notifier = Notifier::new();
        let (cart_count, cart_handler) = counter();
        let (wish_count, wish_handler) = counter();
        let _cart = notifier.subscribe(CART, cart_handler);
        let _wish = notifier.subscribe(WISHLIST, wish_handler);

        assert_eq!(notifier.notify(CART), 1);
        assert_eq!(cart_count.load(Ordering::SeqCst), 1);
        assert_eq!(wish_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let notifier = Notifier::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let subs: Vec<_> = (0..3)
            .map(|i| {
                let order = Arc::clone(&order);
                notifier.subscribe(Topic::IdentityChanged, move |_| order.lock().push(i))
            })
            .collect();

        notifier.notify(Topic::IdentityChanged);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn test_unsubscribe_and_drop_remove_handler() {
        let notifier = Notifier::new();
        let (count, handler) = counter();
        let sub = notifier.subscribe(CART, handler);
        assert_eq!(notifier.subscriber_count(CART), 1);

        sub.unsubscribe();
        assert_eq!(notifier.subscriber_count(CART), 0);
        assert_eq!(notifier.notify(CART), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        let (_, handler) = counter();
        {
            let _scoped = notifier.subscribe(CART, handler);
            assert_eq!(notifier.subscriber_count(CART), 1);
        }
        assert_eq!(notifier.subscriber_count(CART), 0);
    }

    #[test]
    fn test_handler_may_subscribe_during_dispatch() {
        let notifier = Notifier::new();
        let late = Arc::new(Mutex::new(Vec::new()));

        let registrar = notifier.clone();
        let late_subs = Arc::clone(&late);
        let _sub = notifier.subscribe(CART, move |_| {
            let sub = registrar.subscribe(WISHLIST, |_| {});
            late_subs.lock().push(sub);
        });

        notifier.notify(CART);
        assert_eq!(notifier.subscriber_count(WISHLIST), 1);
    }

    #[test]
    fn test_subscription_outliving_notifier() {
        let notifier = Notifier::new();
        let sub = notifier.subscribe(CART, |_| {});
        drop(notifier);
        drop(sub);
    }
}
