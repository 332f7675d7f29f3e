//! Identity resolution.
//!
//! Every collection operation re-resolves who is acting:
//!
//! 1. a live authenticated session wins,
//! 2. otherwise a persisted, unexpired identity hint,
//! 3. otherwise the guest.
//!
//! Resolution never fails. Storage problems and malformed hints are logged and
//! treated as "no hint".

mod hint;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::instrument;

use marketplace_core::{Identity, UserId};

use crate::error::CollectionError;
use crate::notifier::{Notifier, Topic};

pub use hint::{IDENTITY_HINT_KEY, IdentityHint, SessionCache};

/// Source of the live authenticated session.
#[cfg_attr(test, mockall::automock)]
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, if there is a live session.
    fn current_user(&self) -> Option<UserId>;
}

/// In-process authenticated session.
///
/// Signing in or out updates the persisted identity hint and publishes
/// [`Topic::IdentityChanged`].
pub struct AuthSession {
    user: RwLock<Option<UserId>>,
    hints: SessionCache,
    notifier: Notifier,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &*self.user.read())
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Create a signed-out session.
    #[must_use]
    pub fn new(hints: SessionCache, notifier: Notifier) -> Self {
        Self {
            user: RwLock::new(None),
            hints,
            notifier,
        }
    }

    /// Start a live session for `user` and remember it as the identity hint.
    ///
    /// The live session is established even if persisting the hint fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the hint cannot be written.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn sign_in(&self, user: UserId) -> Result<(), CollectionError> {
        *self.user.write() = Some(user.clone());
        let result = self.hints.store(&user).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to persist identity hint");
        }
        self.notifier.notify(Topic::IdentityChanged);
        tracing::info!("Signed in");
        result
    }

    /// End the live session and forget the identity hint.
    ///
    /// # Errors
    ///
    /// Returns an error if the hint cannot be removed.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), CollectionError> {
        let previous = self.user.write().take();
        let result = self.hints.clear().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Failed to clear identity hint");
        }
        self.notifier.notify(Topic::IdentityChanged);
        tracing::info!(user_id = ?previous, "Signed out");
        result
    }
}

impl SessionProvider for AuthSession {
    fn current_user(&self) -> Option<UserId> {
        self.user.read().clone()
    }
}

/// Resolves the acting [`Identity`] for each operation.
#[derive(Clone)]
pub struct IdentityResolver {
    session: Arc<dyn SessionProvider>,
    hints: SessionCache,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("hints", &self.hints)
            .finish_non_exhaustive()
    }
}

impl IdentityResolver {
    #[must_use]
    pub fn new(session: Arc<dyn SessionProvider>, hints: SessionCache) -> Self {
        Self { session, hints }
    }

    /// Resolve the current identity. Never fails.
    pub async fn resolve(&self) -> Identity {
        if let Some(user) = self.session.current_user() {
            return Identity::Authenticated(user);
        }
        match self.hints.load().await {
            Some(user) => Identity::Authenticated(user),
            None => Identity::Guest,
        }
    }

    /// The identity hint cache backing this resolver.
    #[must_use]
    pub const fn hints(&self) -> &SessionCache {
        &self.hints
    }
}
