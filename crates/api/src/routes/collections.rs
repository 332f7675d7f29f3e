//! Collection endpoints.
//!
//! ```text
//! GET  /api/user/{uid}/{kind}          -> { success, items }
//! POST /api/user/{uid}/{kind}/add      <- { product }   -> { success, items }
//! POST /api/user/{uid}/{kind}/remove   <- { productId } -> { success, items }
//! ```
//!
//! `kind` is `cart` or `wishlist`. Request bodies are decoded by hand so that
//! malformed input gets the same JSON error envelope as every other failure.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use marketplace_core::{
    AddRequest, ApiResponse, CollectionItem, EntityKind, RemoveRequest, UserId,
};

use crate::documents::DocumentStore;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// List a user's collection.
pub async fn list(
    State(state): State<AppState>,
    Path((uid, kind)): Path<(String, String)>,
) -> Result<Response> {
    let user = UserId::parse(&uid)?;
    Ok(match kind.parse::<EntityKind>()? {
        EntityKind::Cart => items_response(state.carts().list(&user).await),
        EntityKind::Wishlist => items_response(state.wishlists().list(&user).await),
    })
}

/// Add an item, merging with an existing entry for the same product.
pub async fn add(
    State(state): State<AppState>,
    Path((uid, kind)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response> {
    let user = UserId::parse(&uid)?;
    match kind.parse::<EntityKind>()? {
        EntityKind::Cart => add_item(state.carts(), &user, &body).await,
        EntityKind::Wishlist => add_item(state.wishlists(), &user, &body).await,
    }
}

/// Remove an item. Removing an absent product succeeds.
pub async fn remove(
    State(state): State<AppState>,
    Path((uid, kind)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response> {
    let user = UserId::parse(&uid)?;
    match kind.parse::<EntityKind>()? {
        EntityKind::Cart => remove_item(state.carts(), &user, &body).await,
        EntityKind::Wishlist => remove_item(state.wishlists(), &user, &body).await,
    }
}

async fn add_item<T: CollectionItem>(
    store: &DocumentStore<T>,
    user: &UserId,
    body: &[u8],
) -> Result<Response> {
    let AddRequest { product } = parse_body::<AddRequest<T>>(body)?;
    let product_id = product.id().clone();
    let (outcome, items) = store.upsert(user, product).await;
    tracing::info!(
        kind = %T::KIND,
        user_id = %user,
        product_id = %product_id,
        ?outcome,
        "Collection item added"
    );
    Ok(items_response(items))
}

async fn remove_item<T: CollectionItem>(
    store: &DocumentStore<T>,
    user: &UserId,
    body: &[u8],
) -> Result<Response> {
    let RemoveRequest { product_id } = parse_body(body)?;
    let (removed, items) = store.remove(user, &product_id).await;
    tracing::info!(
        kind = %T::KIND,
        user_id = %user,
        product_id = %product_id,
        removed,
        "Collection item removed"
    );
    Ok(items_response(items))
}

fn parse_body<B: DeserializeOwned>(body: &[u8]) -> Result<B> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid request body: {e}")))
}

fn items_response<T: Serialize>(items: Vec<T>) -> Response {
    Json(ApiResponse::items(items)).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::config::ApiConfig;
    use crate::state::AppState;

    fn app() -> Router {
        crate::app(AppState::new(ApiConfig::default()))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn product(id: &str, price: f64) -> Value {
        json!({ "id": id, "name": id.to_uppercase(), "price": price })
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let app = app();
        let (status, body) = call(&app, "GET", "/api/user/u1/wishlist", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "items": [] }));
    }

    #[tokio::test]
    async fn test_wishlist_add_is_idempotent() {
        let app = app();
        for _ in 0..2 {
            let (status, _) = call(
                &app,
                "POST",
                "/api/user/u1/wishlist/add",
                Some(json!({ "product": product("p1", 9.5) })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = call(&app, "GET", "/api/user/u1/wishlist", None).await;
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], "p1");
        assert!(items[0]["addedAt"].is_string());
    }

    #[tokio::test]
    async fn test_cart_add_accumulates_quantity() {
        let app = app();
        for _ in 0..2 {
            call(
                &app,
                "POST",
                "/api/user/u1/cart/add",
                Some(json!({ "product": product("x", 2.0) })),
            )
            .await;
        }

        let (_, body) = call(&app, "GET", "/api/user/u1/cart", None).await;
        assert_eq!(body["items"][0]["quantity"], 2);
    }

    #[tokio::test]
    async fn test_remove_returns_remaining_items() {
        let app = app();
        call(
            &app,
            "POST",
            "/api/user/u1/wishlist/add",
            Some(json!({ "product": product("p2", 1.0) })),
        )
        .await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/user/u1/wishlist/remove",
            Some(json!({ "productId": "p2" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], json!([]));

        let (status, body) = call(
            &app,
            "POST",
            "/api/user/u1/wishlist/remove",
            Some(json!({ "productId": "missing" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    #[tokio::test]
    async fn test_users_and_kinds_are_partitioned() {
        let app = app();
        call(
            &app,
            "POST",
            "/api/user/u1/cart/add",
            Some(json!({ "product": product("x", 1.0) })),
        )
        .await;

        let (_, other_user) = call(&app, "GET", "/api/user/u2/cart", None).await;
        let (_, other_kind) = call(&app, "GET", "/api/user/u1/wishlist", None).await;
        assert_eq!(other_user["items"], json!([]));
        assert_eq!(other_kind["items"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_kind_is_not_found() {
        let app = app();
        let (status, body) = call(&app, "GET", "/api/user/u1/orders", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "unknown collection kind: orders");
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/user/u1/cart/add",
            Some(json!({ "product": { "id": "" } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().starts_with("invalid request body"));
    }

    #[tokio::test]
    async fn test_null_price_is_rejected_without_touching_items() {
        let app = app();
        call(&app, "POST", "/api/user/u1/wishlist/add", Some(json!({ "product": product("keep", 1.0) }))).await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/user/u1/wishlist/add",
            Some(json!({ "product": { "id": "bad", "name": "Bad", "price": null } })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (_, body) = call(&app, "GET", "/api/user/u1/wishlist", None).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["id"], "keep");
    }

    #[tokio::test]
    async fn test_unknown_route_uses_envelope() {
        let app = app();
        let (status, body) = call(&app, "GET", "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let request = Request::builder()
            .uri("/health")
            .header(crate::middleware::REQUEST_ID_HEADER, "req-42")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[crate::middleware::REQUEST_ID_HEADER],
            "req-42"
        );
    }

    #[tokio::test]
    async fn test_readiness() {
        let request = Request::builder()
            .uri("/health/ready")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
