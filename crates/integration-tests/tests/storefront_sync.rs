//! End-to-end synchronization tests: storefront client against a live
//! collections API.
//!
//! Run with: cargo test -p marketplace-integration-tests

use std::sync::Arc;
use std::time::Duration;

use marketplace_core::{CartItem, EntityKind, Identity, Product, ProductId, UserId, WishlistItem};
use marketplace_integration_tests::TestServer;
use marketplace_storefront::storage::{KeyValueStorage, MemoryStorage};
use marketplace_storefront::{CollectionError, FailureKind, Registration};
use tokio::sync::mpsc;

fn product(id: &str, price: f64) -> Product {
    Product::new(
        ProductId::parse(id).expect("valid product id"),
        format!("Product {id}"),
        price,
    )
}

fn user(id: &str) -> UserId {
    UserId::parse(id).expect("valid user id")
}

async fn next_ids(rx: &mut mpsc::UnboundedReceiver<Vec<WishlistItem>>) -> Vec<String> {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Timed out waiting for a snapshot")
        .expect("Listener channel closed")
        .into_iter()
        .map(|item| item.product.id.into_inner())
        .collect()
}

#[tokio::test]
async fn test_guest_wishlist_is_stored_locally() {
    let server = TestServer::spawn().await;
    let storage = Arc::new(MemoryStorage::new());
    let ctx = server.context_with_storage(Arc::clone(&storage) as Arc<dyn KeyValueStorage>);

    assert_eq!(ctx.wishlist().identity().await, Identity::Guest);
    ctx.wishlist()
        .add(WishlistItem::new(product("p1", 500.0)))
        .await
        .expect("guest add");

    let items = ctx.wishlist().list().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product.id.as_str(), "p1");
    assert!((items[0].product.price - 500.0).abs() < f64::EPSILON);

    let raw = storage
        .get(EntityKind::Wishlist.storage_key())
        .await
        .expect("storage read")
        .expect("guest wishlist persisted locally");
    assert!(raw.contains("\"p1\""));
}

#[tokio::test]
async fn test_authenticated_add_then_remove() {
    let server = TestServer::spawn().await;
    let ctx = server.context();
    ctx.session().sign_in(user("u1")).await.expect("sign in");

    ctx.wishlist()
        .add(WishlistItem::new(product("p2", 12.0)))
        .await
        .expect("remote add");
    assert_eq!(ctx.wishlist().list().await.len(), 1);

    ctx.wishlist()
        .remove(&ProductId::parse("p2").expect("valid id"))
        .await
        .expect("remote remove");
    assert!(ctx.wishlist().list().await.is_empty());
}

#[tokio::test]
async fn test_two_views_observe_remote_add() {
    let server = TestServer::spawn().await;
    let ctx = server.context();
    ctx.session().sign_in(user("u1")).await.expect("sign in");

    let mut views: Vec<(Registration, mpsc::UnboundedReceiver<Vec<WishlistItem>>)> = Vec::new();
    for _ in 0..2 {
        let (tx, rx) = mpsc::unbounded_channel();
        let registration = ctx
            .wishlist()
            .register(move |items| {
                let _ = tx.send(items);
            })
            .await;
        views.push((registration, rx));
    }
    for (_, rx) in &mut views {
        assert!(next_ids(rx).await.is_empty());
    }

    ctx.wishlist()
        .add(WishlistItem::new(product("p3", 3.0)))
        .await
        .expect("remote add");

    for (_, rx) in &mut views {
        assert_eq!(next_ids(rx).await, vec!["p3".to_string()]);
    }
}

#[tokio::test]
async fn test_identity_partition_across_backends() {
    let server = TestServer::spawn().await;
    let ctx = server.context();

    ctx.cart()
        .add(CartItem::new(product("guest-only", 1.0)))
        .await
        .expect("guest add");

    ctx.session().sign_in(user("u1")).await.expect("sign in");
    assert!(ctx.cart().list().await.is_empty());
    ctx.cart()
        .add(CartItem::new(product("u1-only", 1.0)))
        .await
        .expect("remote add");

    ctx.session().sign_in(user("u2")).await.expect("sign in");
    assert!(ctx.cart().list().await.is_empty());

    ctx.session().sign_out().await.expect("sign out");
    let guest = ctx.cart().list().await;
    assert_eq!(guest.len(), 1);
    assert_eq!(guest[0].product.id.as_str(), "guest-only");
}

#[tokio::test]
async fn test_cart_quantity_merges_on_server() {
    let server = TestServer::spawn().await;
    let ctx = server.context();
    ctx.session().sign_in(user("u1")).await.expect("sign in");

    for _ in 0..2 {
        ctx.cart()
            .add(CartItem::new(product("x", 2.0)))
            .await
            .expect("remote add");
    }
    let items = ctx.cart().list().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
}

#[tokio::test]
async fn test_server_down_degrades_gracefully() {
    let server = TestServer::spawn().await;
    let ctx = server.context();
    ctx.session().sign_in(user("u1")).await.expect("sign in");
    drop(server);
    // Give the aborted server task time to release the listener.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(ctx.wishlist().list().await.is_empty());
    let err: CollectionError = ctx
        .wishlist()
        .add(WishlistItem::new(product("p1", 1.0)))
        .await
        .expect_err("add must fail while the API is down");
    assert_eq!(err.kind(), FailureKind::RemoteUnavailable);
}
