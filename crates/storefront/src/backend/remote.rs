//! Authenticated collections in the remote collections API.
//!
//! Uses `reqwest` with JSON bodies. The server owns merge semantics; this side
//! only maps the response envelope onto [`CollectionError`].

use std::marker::PhantomData;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use marketplace_core::{
    AddRequest, ApiResponse, CollectionItem, Identity, ProductId, RemoveRequest, UserId,
};

use super::BackendAdapter;
use crate::config::StorefrontConfig;
use crate::error::{CollectionError, Result};

/// Client for one collection kind of the collections API.
pub struct RemoteBackend<T> {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
    _item: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for RemoteBackend<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteBackend")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

/// Build the shared HTTP client for the collections API.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client(config: &StorefrontConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()?)
}

impl<T: CollectionItem> RemoteBackend<T> {
    /// Create a backend sharing `client` (cheap to clone).
    #[must_use]
    pub fn new(client: reqwest::Client, config: &StorefrontConfig) -> Self {
        Self {
            client,
            base_url: config.api_url.as_str().trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            _item: PhantomData,
        }
    }

    fn collection_url(&self, user: &UserId) -> String {
        format!(
            "{}/api/user/{}/{}",
            self.base_url,
            urlencoding::encode(user.as_str()),
            T::KIND.as_str()
        )
    }

    fn send_with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and unwrap the `{ success, items, message }` envelope.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<T>> {
        let response = self.send_with_auth(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| body.chars().take(200).collect());
            tracing::error!(
                status = %status,
                message = %message,
                "Collections API returned non-success status"
            );
            return Err(CollectionError::RemoteStatus {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.success {
            return Err(CollectionError::Rejected(
                envelope
                    .message
                    .unwrap_or_else(|| "request was not successful".to_string()),
            ));
        }
        Ok(envelope.items.unwrap_or_default())
    }
}

fn require_user(identity: &Identity) -> Result<&UserId> {
    identity.user_id().ok_or(CollectionError::NotAuthenticated)
}

#[async_trait]
impl<T: CollectionItem> BackendAdapter<T> for RemoteBackend<T> {
    #[instrument(skip(self), fields(kind = %T::KIND))]
    async fn fetch(&self, identity: &Identity) -> Result<Vec<T>> {
        let user = require_user(identity)?;
        self.send(self.client.get(self.collection_url(user))).await
    }

    #[instrument(skip(self, item), fields(kind = %T::KIND, product_id = %item.id()))]
    async fn upsert(&self, identity: &Identity, item: T) -> Result<()> {
        let user = require_user(identity)?;
        let url = format!("{}/add", self.collection_url(user));
        self.send(self.client.post(url).json(&AddRequest { product: item }))
            .await
            .map(drop)
    }

    #[instrument(skip(self), fields(kind = %T::KIND))]
    async fn delete(&self, identity: &Identity, id: &ProductId) -> Result<()> {
        let user = require_user(identity)?;
        let url = format!("{}/remove", self.collection_url(user));
        let body = RemoveRequest {
            product_id: id.clone(),
        };
        self.send(self.client.post(url).json(&body)).await.map(drop)
    }
}
