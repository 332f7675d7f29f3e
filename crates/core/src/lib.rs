//! Marketplace Core - Shared types library.
//!
//! This crate provides common types used across all marketplace components:
//! - `storefront` - Synchronized cart and wishlist client
//! - `api` - Reference collections backend
//! - `cli` - Command-line access to collections
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no storage. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated IDs, items, collections, identities and the JSON
//!   wire contract

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
