//! Ekocart Core - Shared types and the shopping cart.
//!
//! This crate provides the domain types used across all Ekocart components:
//! - `storefront` - HTTP storefront (catalog, search, cart, checkout)
//! - `cli` - Command-line cart and catalog tools
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure logic - no network
//! access, no HTTP clients. Cart persistence goes through the [`cart::CartStorage`]
//! trait so each front end decides where the serialized cart lives.
//!
//! # Modules
//!
//! - [`types`] - Prices, product references and validated emails
//! - [`cart`] - Line-item identity, the cart store, pricing and persistence

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use types::*;
