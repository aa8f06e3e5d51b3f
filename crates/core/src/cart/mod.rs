//! Shopping cart core.
//!
//! # Overview
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s, at most one per
//! [`LineItemKey`], each with a quantity of at least one. It is only changed
//! through a [`CartStore`], which writes the serialized cart to its
//! [`CartStorage`] after every mutation.
//!
//! ```
//! use ekocart_core::ProductReference;
//! use ekocart_core::cart::{CartStore, MemoryStorage};
//!
//! let mut store = CartStore::restore(MemoryStorage::default());
//! let shoe = ProductReference::named("Shoe").with_price("₹999").with_website("A");
//!
//! store.add_or_increment(shoe.clone()).unwrap();
//! store.add_or_increment(shoe.with_price("999")).unwrap();
//!
//! assert_eq!(store.snapshot().len(), 1);
//! assert_eq!(store.snapshot()[0].quantity.get(), 2);
//! ```
//!
//! # Modules
//!
//! - [`identity`] - derives the line-item key from a product reference
//! - [`store`] - the cart store and its operations
//! - [`pricing`] - subtotal and checkout totals
//! - [`storage`] - persistence adapter and the serialized layout

pub mod identity;
pub mod pricing;
pub mod storage;
pub mod store;

use core::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductReference;

pub use identity::resolve_key;
pub use pricing::{
    CheckoutTotals, PriceParseWarning, Subtotal, checked_line_total, line_total, subtotal, unit_price,
};
pub use storage::{
    CartStorage, MemoryStorage, PersistenceCorruptError, STORAGE_KEY, StorageError,
    deserialize_cart, serialize_cart,
};
pub use store::{CartStore, CartTarget};

/// Stable identity for "the same purchasable item".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemKey(String);

impl LineItemKey {
    /// Wrap an already-derived key, e.g. one echoed back by a client.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LineItemKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// Errors raised when a product cannot become a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidProductError {
    /// The product has no display name.
    #[error("product has no display name")]
    MissingDisplayName,
}

/// One product in the cart with its quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    /// Identity of this line.
    pub key: LineItemKey,
    /// Product snapshot taken when the line was first added.
    pub product: ProductReference,
    /// Number of units, never zero.
    pub quantity: NonZeroU32,
}

/// An ordered collection of line items, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Find the line with the given key.
    #[must_use]
    pub fn find(&self, key: &LineItemKey) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.key == key)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items
            .iter()
            .map(|item| u64::from(item.quantity.get()))
            .sum()
    }

    fn position(&self, key: &LineItemKey) -> Option<usize> {
        self.items.iter().position(|item| &item.key == key)
    }

    fn find_mut(&mut self, key: &LineItemKey) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| &item.key == key)
    }

    fn push(&mut self, item: LineItem) {
        self.items.push(item);
    }

    fn remove_at(&mut self, index: usize) -> LineItem {
        self.items.remove(index)
    }
}
