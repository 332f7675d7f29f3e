//! Marketplace storefront client library.
//!
//! Keeps a shopper's cart and wishlist synchronized between the collections
//! API (signed-in users) and local persistent storage (guests), and pushes
//! fresh snapshots to every registered view after each confirmed change.
//!
//! Start from [`AppContext`](state::AppContext).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod identity;
pub mod listener;
pub mod notifier;
pub mod state;
pub mod storage;
pub mod store;

pub use config::StorefrontConfig;
pub use error::{CollectionError, FailureKind};
pub use listener::Registration;
pub use notifier::{Notifier, Subscription, Topic};
pub use state::AppContext;
pub use store::CollectionStore;
