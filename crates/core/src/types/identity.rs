//! The acting identity that scopes a collection.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Who is performing a collection operation.
///
/// Authenticated identities are backed by the remote backend; guests are
/// backed by local persistent storage. Collections never leak between the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "userId", rename_all = "snake_case")]
pub enum Identity {
    Authenticated(UserId),
    Guest,
}

impl Identity {
    /// Returns the user ID for authenticated identities.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::Authenticated(id) => Some(id),
            Self::Guest => None,
        }
    }

    /// Returns `true` for guest identities.
    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated(id) => write!(f, "user:{id}"),
            Self::Guest => f.write_str("guest"),
        }
    }
}
