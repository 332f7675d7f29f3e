//! Core types for marketplace collections.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the storefront client and the collections API.

pub mod entity;
pub mod id;
pub mod identity;
pub mod item;
pub mod wire;

pub use entity::{EntityKind, UnknownEntityKind};
pub use id::*;
pub use identity::Identity;
pub use item::{
    CartItem, Collection, CollectionItem, NonFinitePrice, Product, Upsert, WishlistItem,
};
pub use wire::{AddRequest, ApiResponse, RemoveRequest};
