//! Collection error types.
//!
//! Every failure a collection operation can hit is a [`CollectionError`]. The
//! store never panics on them: reads degrade to an empty list and writes return
//! the error as a value.

use core::fmt;

use thiserror::Error;

use marketplace_core::NonFinitePrice;

use crate::storage::StorageError;

/// Errors that can occur during collection operations.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// HTTP request to the collections API failed (connect, timeout, decode).
    #[error("collections API unavailable: {0}")]
    RemoteUnavailable(#[from] reqwest::Error),

    /// Collections API answered with a non-success status.
    #[error("collections API returned HTTP {status}: {message}")]
    RemoteStatus { status: u16, message: String },

    /// Collections API answered `success: false`.
    #[error("collections API rejected the request: {0}")]
    Rejected(String),

    /// Locally persisted state could not be parsed.
    #[error("malformed local state under '{key}': {source}")]
    MalformedLocalState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Local state could not be serialized.
    #[error("failed to encode local state: {0}")]
    Encode(#[source] serde_json::Error),

    /// Local storage I/O failed.
    #[error("local storage error: {0}")]
    Storage(#[from] StorageError),

    /// The item cannot be stored as given.
    #[error("invalid item: {0}")]
    InvalidItem(#[from] NonFinitePrice),

    /// A remote operation was attempted without an authenticated identity.
    #[error("not authenticated")]
    NotAuthenticated,
}

/// Coarse failure classification reported alongside logged errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    RemoteUnavailable,
    Rejected,
    MalformedLocalState,
    LocalStorage,
    NotAuthenticated,
    InvalidItem,
}

impl FailureKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RemoteUnavailable => "remote_unavailable",
            Self::Rejected => "rejected",
            Self::MalformedLocalState => "malformed_local_state",
            Self::LocalStorage => "local_storage",
            Self::NotAuthenticated => "not_authenticated",
            Self::InvalidItem => "invalid_item",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CollectionError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::RemoteUnavailable(_) | Self::RemoteStatus { .. } => {
                FailureKind::RemoteUnavailable
            }
            Self::Rejected(_) => FailureKind::Rejected,
            Self::MalformedLocalState { .. } => FailureKind::MalformedLocalState,
            Self::Encode(_) | Self::Storage(_) => FailureKind::LocalStorage,
            Self::NotAuthenticated => FailureKind::NotAuthenticated,
            Self::InvalidItem(_) => FailureKind::InvalidItem,
        }
    }
}

/// Result type alias for `CollectionError`.
pub type Result<T> = std::result::Result<T, CollectionError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_error_display() {
        let err = CollectionError::Rejected("unknown product".to_string());
        assert_eq!(
            err.to_string(),
            "collections API rejected the request: unknown product"
        );

        let err = CollectionError::RemoteStatus {
            status: 503,
            message: "down".to_string(),
        };
        assert_eq!(err.to_string(), "collections API returned HTTP 503: down");
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            CollectionError::RemoteStatus {
                status: 500,
                message: String::new()
            }
            .kind(),
            FailureKind::RemoteUnavailable
        );
        assert_eq!(
            CollectionError::NotAuthenticated.kind(),
            FailureKind::NotAuthenticated
        );

        let parse_err = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = CollectionError::MalformedLocalState {
            key: "marketplace.cart".to_string(),
            source: parse_err,
        };
        assert_eq!(err.kind(), FailureKind::MalformedLocalState);
        assert_eq!(err.kind().to_string(), "malformed_local_state");

        let err = CollectionError::from(marketplace_core::NonFinitePrice(f64::NAN));
        assert_eq!(err.kind(), FailureKind::InvalidItem);
    }
}
