//! Collection items and the insertion-ordered collection they live in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use super::entity::EntityKind;
use super::id::ProductId;

/// A price that is NaN or infinite.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("price must be a finite number, got {0}")]
pub struct NonFinitePrice(pub f64);

fn finite_price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let price = f64::deserialize(deserializer)?;
    if price.is_finite() {
        Ok(price)
    } else {
        Err(serde::de::Error::custom(NonFinitePrice(price)))
    }
}

/// Product details captured when an item is added to a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable product identifier, unique within a collection.
    pub id: ProductId,
    pub name: String,
    /// Price in whatever unit the catalog uses. Always finite once validated.
    #[serde(deserialize_with = "finite_price")]
    pub price: f64,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Category label.
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// Create a product snapshot with no image or category.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            image: String::new(),
            category: String::new(),
        }
    }

    /// Check that the price can be stored and sent over the wire.
    ///
    /// JSON has no NaN or infinity, so such a price would be written as
    /// `null` and make the whole stored collection unreadable.
    ///
    /// # Errors
    ///
    /// Returns [`NonFinitePrice`] if the price is NaN or infinite.
    pub const fn validate(&self) -> Result<(), NonFinitePrice> {
        if self.price.is_finite() {
            Ok(())
        } else {
            Err(NonFinitePrice(self.price))
        }
    }
}

/// Behaviour shared by every item type that can live in a [`Collection`].
pub trait CollectionItem:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The collection kind this item belongs to.
    const KIND: EntityKind;

    /// The product snapshot.
    fn product(&self) -> &Product;

    /// Identifier used for uniqueness within a collection.
    fn id(&self) -> &ProductId {
        &self.product().id
    }

    /// Timestamp of first insertion.
    fn added_at(&self) -> DateTime<Utc>;

    /// Prepare a fresh item for insertion at `now`.
    fn stamp(&mut self, now: DateTime<Utc>);

    /// Fold a repeat add of the same product into the existing entry.
    fn merge(&mut self, incoming: &Self);
}

fn default_quantity() -> u32 {
    1
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Always at least 1 once stored.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// A cart line with quantity 1.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self::with_quantity(product, 1)
    }

    /// A cart line with the given quantity (zero is treated as 1).
    #[must_use]
    pub fn with_quantity(product: Product, quantity: u32) -> Self {
        Self {
            product,
            quantity: quantity.max(1),
            added_at: Utc::now(),
        }
    }
}

impl CollectionItem for CartItem {
    const KIND: EntityKind = EntityKind::Cart;

    fn product(&self) -> &Product {
        &self.product
    }

    fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        self.added_at = now;
        self.quantity = self.quantity.max(1);
    }

    fn merge(&mut self, incoming: &Self) {
        self.quantity = self.quantity.saturating_add(incoming.quantity.max(1));
    }
}

/// A wishlist entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    #[serde(flatten)]
    pub product: Product,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            product,
            added_at: Utc::now(),
        }
    }
}

impl CollectionItem for WishlistItem {
    const KIND: EntityKind = EntityKind::Wishlist;

    fn product(&self) -> &Product {
        &self.product
    }

    fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    fn stamp(&mut self, now: DateTime<Utc>) {
        self.added_at = now;
    }

    // Re-adding a wishlisted product is idempotent.
    fn merge(&mut self, _incoming: &Self) {}
}

/// Result of [`Collection::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Merged,
}

/// Insertion-ordered items of one identity, at most one per product ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: CollectionItem> Collection<T> {
    /// Build a collection from stored items, dropping later duplicates.
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        let mut collection = Self::default();
        for item in items {
            if collection.get(item.id()).is_none() {
                collection.items.push(item);
            }
        }
        collection
    }

    /// Insert `item` stamped at `now`, or merge it into the existing entry.
    ///
    /// Merging never touches the existing entry's `added_at`.
    pub fn upsert(&mut self, mut item: T, now: DateTime<Utc>) -> Upsert {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id() == item.id()) {
            existing.merge(&item);
            return Upsert::Merged;
        }
        item.stamp(now);
        self.items.push(item);
        Upsert::Inserted
    }

    /// Remove the entry for `id`. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        self.items.len() != before
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&T> {
        self.items.iter().find(|i| i.id() == id)
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
