//! The cart store.
//!
//! Owns the [`Cart`] for one shopping session and is the only way to change
//! it. Every mutation is written through to the [`CartStorage`] before the
//! call returns, so the stored copy always reflects the latest operation.

use std::num::NonZeroU32;

use tracing::{debug, warn};

use super::identity::resolve_key;
use super::pricing::{self, Subtotal};
use super::storage::{CartStorage, deserialize_cart, serialize_cart};
use super::{Cart, InvalidProductError, LineItem, LineItemKey};
use crate::types::ProductReference;

/// What `remove` and `decrement` act on: a known key, or a product whose key
/// is resolved first.
#[derive(Debug, Clone)]
pub enum CartTarget {
    Key(LineItemKey),
    Product(ProductReference),
}

impl CartTarget {
    /// The line-item key this target refers to.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProductError`] if a product target cannot be identified.
    pub fn key(&self) -> Result<LineItemKey, InvalidProductError> {
        match self {
            Self::Key(key) => Ok(key.clone()),
            Self::Product(product) => resolve_key(product),
        }
    }
}

impl From<LineItemKey> for CartTarget {
    fn from(key: LineItemKey) -> Self {
        Self::Key(key)
    }
}

impl From<&LineItemKey> for CartTarget {
    fn from(key: &LineItemKey) -> Self {
        Self::Key(key.clone())
    }
}

impl From<ProductReference> for CartTarget {
    fn from(product: ProductReference) -> Self {
        Self::Product(product)
    }
}

impl From<&ProductReference> for CartTarget {
    fn from(product: &ProductReference) -> Self {
        Self::Product(product.clone())
    }
}

/// Cart state plus the storage it is persisted to.
#[derive(Debug)]
pub struct CartStore<S: CartStorage> {
    cart: Cart,
    storage: S,
}

impl<S: CartStorage> CartStore<S> {
    /// Restore the cart from storage.
    ///
    /// Absent data gives an empty cart. Unreadable or corrupt data is logged
    /// and also gives an empty cart; it is never an error for the caller.
    pub fn restore(storage: S) -> Self {
        let cart = match storage.load() {
            Ok(Some(serialized)) => deserialize_cart(&serialized).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding corrupt persisted cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load persisted cart");
                Cart::new()
            }
        };

        debug!(lines = cart.len(), "Cart restored");
        Self { cart, storage }
    }

    /// Add one unit of a product and return the updated line.
    ///
    /// An existing line keeps its stored product snapshot and gains one unit;
    /// otherwise a new line with quantity one is appended.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProductError`] if the product has no identity.
    pub fn add_or_increment(
        &mut self,
        product: ProductReference,
    ) -> Result<LineItem, InvalidProductError> {
        let key = resolve_key(&product)?;

        let line = if let Some(item) = self.cart.find_mut(&key) {
            item.quantity = item.quantity.saturating_add(1);
            debug!(key = %key, quantity = item.quantity.get(), "Incremented cart line");
            item.clone()
        } else {
            debug!(key = %key, "Added cart line");
            let item = LineItem {
                key,
                product,
                quantity: NonZeroU32::MIN,
            };
            self.cart.push(item.clone());
            item
        };

        self.persist();
        Ok(line)
    }

    /// Remove a line entirely. Removing an absent line is a no-op.
    ///
    /// Returns the removed line, if there was one.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProductError`] if the target is a product without identity.
    pub fn remove(
        &mut self,
        target: impl Into<CartTarget>,
    ) -> Result<Option<LineItem>, InvalidProductError> {
        let key = target.into().key()?;

        let Some(index) = self.cart.position(&key) else {
            debug!(key = %key, "Remove of absent cart line ignored");
            return Ok(None);
        };

        let removed = self.cart.remove_at(index);
        debug!(key = %key, "Removed cart line");
        self.persist();
        Ok(Some(removed))
    }

    /// Take one unit off a line, removing it when the last unit goes.
    ///
    /// Returns the remaining quantity: `None` when the line is gone or was
    /// never there. A quantity of zero is never observable.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidProductError`] if the target is a product without identity.
    pub fn decrement(
        &mut self,
        target: impl Into<CartTarget>,
    ) -> Result<Option<NonZeroU32>, InvalidProductError> {
        let key = target.into().key()?;

        let Some(index) = self.cart.position(&key) else {
            debug!(key = %key, "Decrement of absent cart line ignored");
            return Ok(None);
        };

        let remaining = self
            .cart
            .find_mut(&key)
            .and_then(|item| {
                let next = NonZeroU32::new(item.quantity.get() - 1)?;
                item.quantity = next;
                Some(next)
            });

        if remaining.is_none() {
            self.cart.remove_at(index);
            debug!(key = %key, "Removed cart line at zero quantity");
        }

        self.persist();
        Ok(remaining)
    }

    /// Current line items in insertion order.
    #[must_use]
    pub fn snapshot(&self) -> &[LineItem] {
        self.cart.items()
    }

    /// The cart itself, read-only.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Total units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    /// Subtotal of the current cart.
    #[must_use]
    pub fn subtotal(&self) -> Subtotal {
        pricing::subtotal(&self.cart)
    }

    /// The storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consume the store and return its storage.
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn persist(&mut self) {
        let result = serialize_cart(&self.cart).and_then(|json| self.storage.save(&json));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cart");
        }
    }
}
