//! Session-backed cart extractor.
//!
//! The serialized cart lives in the session under [`session_keys::CART`].
//! [`SessionCart`] restores it into a [`CartStore`] over [`MemoryStorage`];
//! the store writes every mutation to that buffer, and [`SessionCart::save`]
//! copies the buffer back into the session.

use axum::{extract::FromRequestParts, http::request::Parts};
use ekocart_core::cart::{Cart, CartStore, MemoryStorage};
use tower_sessions::Session;
use tracing::warn;

use crate::error::AppError;
use crate::models::session_keys;

/// The shopping cart of the current session.
///
/// # Example
///
/// ```rust,ignore
/// async fn add(mut cart: SessionCart, Json(product): Json<ProductReference>) -> Result<...> {
///     cart.store_mut().add_or_increment(product)?;
///     cart.save().await?;
///     ...
/// }
/// ```
pub struct SessionCart {
    session: Session,
    store: CartStore<MemoryStorage>,
}

impl SessionCart {
    /// Restore the cart stored in a session.
    ///
    /// A stored value that cannot be read is logged and treated as an empty
    /// cart.
    pub async fn load(session: Session) -> Self {
        let stored = session
            .get::<String>(session_keys::CART)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read cart from session");
                None
            });

        let storage = stored.map_or_else(MemoryStorage::default, MemoryStorage::with_value);

        Self {
            session,
            store: CartStore::restore(storage),
        }
    }

    /// The cart store, read-only.
    #[must_use]
    pub const fn store(&self) -> &CartStore<MemoryStorage> {
        &self.store
    }

    /// The cart store, for mutations.
    pub const fn store_mut(&mut self) -> &mut CartStore<MemoryStorage> {
        &mut self.store
    }

    /// The current cart.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.store.cart()
    }

    /// Write the cart back to the session if the store persisted anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&self) -> Result<(), tower_sessions::session::Error> {
        let storage = self.store.storage();
        if storage.writes() == 0 {
            return Ok(());
        }

        match storage.value() {
            Some(serialized) => self.session.insert(session_keys::CART, serialized).await,
            None => Ok(()),
        }
    }
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        Ok(Self::load(session).await)
    }
}
