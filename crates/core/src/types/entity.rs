//! Collection entity kinds.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown [`EntityKind`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown collection kind: {0}")]
pub struct UnknownEntityKind(pub String);

/// The kind of synchronized collection.
///
/// Each kind has its own change channel, its own remote endpoints and its own
/// fixed local-storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Cart,
    Wishlist,
}

impl EntityKind {
    /// All collection kinds.
    pub const ALL: [Self; 2] = [Self::Cart, Self::Wishlist];

    /// URL path segment used by the remote backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Wishlist => "wishlist",
        }
    }

    /// Fixed key under which guest collections are persisted locally.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Cart => "marketplace.cart",
            Self::Wishlist => "marketplace.wishlist",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cart" => Ok(Self::Cart),
            "wishlist" => Ok(Self::Wishlist),
            other => Err(UnknownEntityKind(other.to_owned())),
        }
    }
}
