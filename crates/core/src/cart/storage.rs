//! Cart persistence adapter.
//!
//! A [`CartStorage`] holds one serialized cart: a JSON array with one object
//! per line, the product fields flattened next to a `quantity`:
//!
//! ```json
//! [{"name":"Shoe","price":"₹999","website":"A","quantity":2}]
//! ```
//!
//! Keys are not stored; they are derived again on load, so a persisted cart
//! can never disagree with the identity rules.

use std::collections::HashSet;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::identity::resolve_key;
use super::{Cart, InvalidProductError, LineItem, LineItemKey};
use crate::types::ProductReference;

/// Well-known key the serialized cart is stored under.
pub const STORAGE_KEY: &str = "cart";

/// Errors reported by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be read or written.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend rejected the operation for another reason.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The cart could not be serialized.
    #[error("cart serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted data that does not describe a valid cart.
#[derive(Debug, Error)]
pub enum PersistenceCorruptError {
    /// The data is not a JSON array of line objects.
    #[error("persisted cart is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A persisted line has no usable identity.
    #[error("persisted line {index} is not a valid product: {source}")]
    InvalidProduct {
        /// Position of the line in the persisted array.
        index: usize,
        /// Why the product could not be identified.
        source: InvalidProductError,
    },

    /// Two persisted lines resolve to the same key.
    #[error("persisted cart has duplicate line {0}")]
    DuplicateKey(LineItemKey),
}

/// Minimal key-value persistence for one serialized cart.
pub trait CartStorage {
    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn save(&mut self, serialized: &str) -> Result<(), StorageError>;

    /// Read the stored cart, `None` when nothing has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;
}

/// In-memory storage.
///
/// Used directly in tests and as a buffer by front ends whose real store is
/// asynchronous (the HTTP session): the cart is restored from a loaded value,
/// mutated, and [`MemoryStorage::into_value`] is written back.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    value: Option<String>,
    writes: usize,
}

impl MemoryStorage {
    /// Storage pre-filled with a serialized cart.
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            writes: 0,
        }
    }

    /// The currently stored value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Consume the storage and return the stored value.
    #[must_use]
    pub fn into_value(self) -> Option<String> {
        self.value
    }

    /// How many times [`CartStorage::save`] has been called.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl CartStorage for MemoryStorage {
    fn save(&mut self, serialized: &str) -> Result<(), StorageError> {
        self.value = Some(serialized.to_string());
        self.writes += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.value.clone())
    }
}

#[derive(Serialize)]
struct PersistedLineRef<'a> {
    #[serde(flatten)]
    product: &'a ProductReference,
    quantity: NonZeroU32,
}

#[derive(Deserialize)]
struct PersistedLine {
    #[serde(flatten)]
    product: ProductReference,
    quantity: NonZeroU32,
}

/// Encode a cart in the persisted layout.
///
/// # Errors
///
/// Returns [`StorageError::Serialize`] if JSON encoding fails.
pub fn serialize_cart(cart: &Cart) -> Result<String, StorageError> {
    let lines: Vec<PersistedLineRef<'_>> = cart
        .items()
        .iter()
        .map(|item| PersistedLineRef {
            product: &item.product,
            quantity: item.quantity,
        })
        .collect();
    Ok(serde_json::to_string(&lines)?)
}

/// Decode a persisted cart, re-deriving and checking every key.
///
/// # Errors
///
/// Returns a [`PersistenceCorruptError`] if the JSON is malformed, a quantity
/// is zero, a line has no identity, or two lines share a key.
pub fn deserialize_cart(serialized: &str) -> Result<Cart, PersistenceCorruptError> {
    let lines: Vec<PersistedLine> = serde_json::from_str(serialized)?;

    let mut cart = Cart::new();
    let mut seen = HashSet::with_capacity(lines.len());

    for (index, line) in lines.into_iter().enumerate() {
        let key = resolve_key(&line.product)
            .map_err(|source| PersistenceCorruptError::InvalidProduct { index, source })?;

        if !seen.insert(key.clone()) {
            return Err(PersistenceCorruptError::DuplicateKey(key));
        }

        cart.push(LineItem {
            key,
            product: line.product,
            quantity: line.quantity,
        });
    }

    Ok(cart)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(product: ProductReference, quantity: u32) -> LineItem {
        LineItem {
            key: resolve_key(&product).unwrap(),
            product,
            quantity: NonZeroU32::new(quantity).unwrap(),
        }
    }

    #[test]
    fn test_round_trip_preserves_keys_quantities_and_order() {
        let mut cart = Cart::new();
        cart.push(line(
            ProductReference::named("Shoe")
                .with_price("₹999")
                .with_website("A"),
            2,
        ));
        cart.push(line(
            ProductReference::named("Backpack").with_id(1_i64).with_price(109.95),
            1,
        ));
        cart.push(line(
            ProductReference::named("Lamp")
                .with_price("$19.99")
                .with_brand("Glow"),
            5,
        ));

        let json = serialize_cart(&cart).unwrap();
        let restored = deserialize_cart(&json).unwrap();

        assert_eq!(restored, cart);
    }

    #[test]
    fn test_layout_flattens_product_fields() {
        let mut cart = Cart::new();
        cart.push(line(
            ProductReference::named("Shoe")
                .with_price("₹999")
                .with_website("A"),
            2,
        ));

        let json = serialize_cart(&cart).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"Shoe","price":"₹999","website":"A","quantity":2}]"#
        );
    }

    #[test]
    fn test_reads_browser_layout_with_title() {
        let json = r#"[{"id":3,"title":"Jacket","price":55.99,"image":"x.jpg","quantity":1}]"#;
        let cart = deserialize_cart(json).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].key.as_str(), "id:3");
    }

    #[test]
    fn test_empty_array_is_empty_cart() {
        assert!(deserialize_cart("[]").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            deserialize_cart("{not json"),
            Err(PersistenceCorruptError::Json(_))
        ));
    }

    #[test]
    fn test_zero_quantity_is_corrupt() {
        let json = r#"[{"name":"Shoe","quantity":0}]"#;
        assert!(matches!(
            deserialize_cart(json),
            Err(PersistenceCorruptError::Json(_))
        ));
    }

    #[test]
    fn test_nameless_line_is_corrupt() {
        let json = r#"[{"name":"Shoe","quantity":1},{"price":5,"quantity":1}]"#;
        assert!(matches!(
            deserialize_cart(json),
            Err(PersistenceCorruptError::InvalidProduct { index: 1, .. })
        ));
    }

    #[test]
    fn test_duplicate_key_is_corrupt() {
        let json = r#"[
            {"name":"Shoe","price":"₹999","website":"A","quantity":1},
            {"name":"Shoe","price":"999","website":"A","quantity":3}
        ]"#;
        assert!(matches!(
            deserialize_cart(json),
            Err(PersistenceCorruptError::DuplicateKey(_))
        ));
    }

    #[test]
    fn test_memory_storage_counts_writes() {
        let mut storage = MemoryStorage::default();
        assert_eq!(storage.load().unwrap(), None);

        storage.save("[]").unwrap();
        storage.save("[1]").unwrap();

        assert_eq!(storage.writes(), 2);
        assert_eq!(storage.value(), Some("[1]"));
    }
}
