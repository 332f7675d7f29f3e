//! Cart and wishlist commands.

use std::io::Write;

use marketplace_core::{ApiResponse, CollectionItem, Product, ProductId};
use marketplace_storefront::CollectionStore;

use super::{CliError, emit};

/// Product fields given on the command line.
#[derive(Debug, Clone)]
pub struct ProductArgs {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
    pub category: Option<String>,
}

impl ProductArgs {
    /// Validate the arguments into a [`Product`].
    ///
    /// # Errors
    ///
    /// Returns an error if the product ID is invalid or the price is not finite.
    pub fn into_product(self) -> Result<Product, CliError> {
        let mut product = Product::new(ProductId::parse(&self.id)?, self.name, self.price);
        product.validate()?;
        product.image = self.image.unwrap_or_default();
        product.category = self.category.unwrap_or_default();
        Ok(product)
    }
}

/// Print the current items.
pub async fn list<T: CollectionItem, W: Write>(
    store: &CollectionStore<T>,
    out: &mut W,
) -> Result<(), CliError> {
    emit(out, &store.list().await)
}

/// Add `item` and print the resulting items.
pub async fn add<T: CollectionItem, W: Write>(
    store: &CollectionStore<T>,
    item: T,
    out: &mut W,
) -> Result<(), CliError> {
    let result = store.add(item).await;
    report(store, result, out).await
}

/// Remove `id` and print the resulting items.
pub async fn remove<T: CollectionItem, W: Write>(
    store: &CollectionStore<T>,
    id: &str,
    out: &mut W,
) -> Result<(), CliError> {
    let id = ProductId::parse(id)?;
    let result = store.remove(&id).await;
    report(store, result, out).await
}

async fn report<T: CollectionItem, W: Write>(
    store: &CollectionStore<T>,
    result: marketplace_storefront::error::Result<()>,
    out: &mut W,
) -> Result<(), CliError> {
    match result {
        Ok(()) => emit(out, &ApiResponse::items(store.list().await)),
        Err(e) => {
            let err = CliError::from(e);
            emit(out, &ApiResponse::<T>::failure(err.to_string()))?;
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use marketplace_core::{CartItem, UserId, WishlistItem};
    use marketplace_storefront::storage::{KeyValueStorage, MemoryStorage};
    use marketplace_storefront::{AppContext, StorefrontConfig};
    use serde_json::Value;

    use super::*;

    fn context() -> AppContext {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        AppContext::new(StorefrontConfig::default(), storage).unwrap()
    }

    fn args(id: &str, price: f64) -> ProductArgs {
        ProductArgs {
            id: id.to_string(),
            name: format!("Product {id}"),
            price,
            image: Some("https://img.test/p.png".to_string()),
            category: None,
        }
    }

    fn parse(out: &[u8]) -> Value {
        serde_json::from_slice(out).unwrap()
    }

    #[test]
    fn test_non_finite_price_argument_is_rejected() {
        let err = args("p1", f64::NAN).into_product().unwrap_err();
        assert!(matches!(err, CliError::InvalidPrice(_)));
        assert!(args("p1", f64::INFINITY).into_product().is_err());
    }

    #[tokio::test]
    async fn test_guest_add_list_remove() {
        let ctx = context();

        let mut out = Vec::new();
        let item = WishlistItem::new(args("p1", 500.0).into_product().unwrap());
        add(ctx.wishlist(), item, &mut out).await.unwrap();
        let body = parse(&out);
        assert_eq!(body["success"], true);
        assert_eq!(body["items"][0]["price"], 500.0);
        assert_eq!(body["items"][0]["image"], "https://img.test/p.png");

        let mut out = Vec::new();
        list(ctx.wishlist(), &mut out).await.unwrap();
        assert_eq!(parse(&out).as_array().unwrap().len(), 1);

        let mut out = Vec::new();
        remove(ctx.wishlist(), "p1", &mut out).await.unwrap();
        assert_eq!(parse(&out)["items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_cart_quantity_from_args() {
        let ctx = context();
        let mut out = Vec::new();
        let item = CartItem::with_quantity(args("x", 2.0).into_product().unwrap(), 3);
        add(ctx.cart(), item, &mut out).await.unwrap();
        assert_eq!(parse(&out)["items"][0]["quantity"], 3);
    }

    #[tokio::test]
    async fn test_failed_mutation_reports_envelope() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        // Nothing listens on port 9, so the remote add fails.
        let config = StorefrontConfig::default()
            .with_api_url("http://127.0.0.1:9")
            .unwrap();
        let remote_ctx = AppContext::new(config, storage).unwrap();
        remote_ctx
            .session()
            .sign_in(UserId::parse("u1").unwrap())
            .await
            .unwrap();

        let mut out = Vec::new();
        let item = WishlistItem::new(args("p1", 1.0).into_product().unwrap());
        let err = add(remote_ctx.wishlist(), item, &mut out).await.unwrap_err();
        assert!(err.to_string().starts_with("remote_unavailable"));

        let body = parse(&out);
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    #[test]
    fn test_invalid_product_id() {
        let err = args("a/b", 1.0).into_product().unwrap_err();
        assert!(matches!(err, CliError::InvalidId(_)));
    }
}
