//! JSON contract between the storefront client and the collections API.
//!
//! ```text
//! GET  /api/user/{uid}/{kind}          -> { success, items }
//! POST /api/user/{uid}/{kind}/add      <- { product }   -> { success, items }
//! POST /api/user/{uid}/{kind}/remove   <- { productId } -> { success, items }
//! ```
//!
//! Failures are `{ success: false, message }`.

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Response envelope for every collections endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// A successful response carrying the current items.
    #[must_use]
    pub fn items(items: Vec<T>) -> Self {
        Self {
            success: true,
            items: Some(items),
            message: None,
        }
    }

    /// A failed response with a human-readable message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            items: None,
            message: Some(message.into()),
        }
    }
}

/// Body of `POST .../add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRequest<T> {
    pub product: T,
}

/// Body of `POST .../remove`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub product_id: ProductId,
}
