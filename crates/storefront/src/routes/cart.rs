//! Cart route handlers.
//!
//! Every handler works on the session cart through [`SessionCart`]. Mutating
//! handlers save the cart back to the session and answer with the updated
//! cart view, so the page and the sidebar can re-render from one response.

use axum::{Json, extract::State};
use ekocart_core::cart::{CartTarget, LineItem, LineItemKey, PriceParseWarning, line_total};
use ekocart_core::{CurrencyCode, Money, ProductReference};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::SessionCart;
use crate::state::AppState;

// =============================================================================
// Views
// =============================================================================

/// One cart line as displayed.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub key: LineItemKey,
    pub product: ProductReference,
    pub quantity: u32,
    pub line_total: Money,
    pub line_total_display: String,
}

impl CartLineView {
    fn new(item: &LineItem, currency: CurrencyCode) -> Self {
        let total = Money::new(line_total(item), currency);
        Self {
            key: item.key.clone(),
            product: item.product.clone(),
            quantity: item.quantity.get(),
            line_total_display: total.display(),
            line_total: total,
        }
    }
}

/// The cart page.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    pub subtotal: Decimal,
    pub subtotal_display: String,
    pub warnings: Vec<PriceParseWarning>,
}

impl CartView {
    fn new(cart: &SessionCart, currency: CurrencyCode) -> Self {
        let store = cart.store();
        let subtotal = store.subtotal();
        Self {
            items: store
                .snapshot()
                .iter()
                .map(|item| CartLineView::new(item, currency))
                .collect(),
            item_count: store.item_count(),
            subtotal_display: Money::new(subtotal.amount, currency).display(),
            subtotal: subtotal.amount,
            warnings: subtotal.warnings,
        }
    }
}

/// The cart sidebar: the same snapshot plus the number of distinct lines.
#[derive(Debug, Clone, Serialize)]
pub struct SidebarView {
    pub line_count: usize,
    #[serde(flatten)]
    pub cart: CartView,
}

/// Cart badge.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountView {
    pub count: u64,
}

/// Response to a cart mutation.
#[derive(Debug, Clone, Serialize)]
pub struct CartUpdate {
    /// Line the operation acted on, when it resolved to one.
    pub key: Option<LineItemKey>,
    /// Quantity left on that line; `None` when the line is gone.
    pub quantity: Option<u32>,
    pub cart: CartView,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Body of remove and decrease: a key from a previous view, or a product.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetBody {
    Key(LineItemKey),
    Product(ProductReference),
}

impl From<TargetBody> for CartTarget {
    fn from(body: TargetBody) -> Self {
        match body {
            TargetBody::Key(key) => Self::Key(key),
            TargetBody::Product(product) => Self::Product(product),
        }
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, cart: SessionCart) -> Json<CartView> {
    Json(CartView::new(&cart, state.config().currency))
}

/// Cart sidebar contents.
#[instrument(skip(state, cart))]
pub async fn sidebar(State(state): State<AppState>, cart: SessionCart) -> Json<SidebarView> {
    Json(SidebarView {
        line_count: cart.cart().len(),
        cart: CartView::new(&cart, state.config().currency),
    })
}

/// Cart count badge.
#[instrument(skip(cart))]
pub async fn count(cart: SessionCart) -> Json<CountView> {
    Json(CountView {
        count: cart.store().item_count(),
    })
}

/// Add one unit of a product.
#[instrument(skip(state, cart, product))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Json(product): Json<ProductReference>,
) -> Result<Json<CartUpdate>> {
    let line = cart.store_mut().add_or_increment(product)?;
    cart.save().await?;

    add_breadcrumb("cart", "Added item", Some(&[("key", line.key.as_str())]));
    tracing::info!(key = %line.key, quantity = line.quantity.get(), "Added to cart");

    Ok(Json(CartUpdate {
        quantity: Some(line.quantity.get()),
        key: Some(line.key),
        cart: CartView::new(&cart, state.config().currency),
    }))
}

/// Remove a line entirely.
#[instrument(skip(state, cart, body))]
pub async fn remove(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Json(body): Json<TargetBody>,
) -> Result<Json<CartUpdate>> {
    let removed = cart.store_mut().remove(body)?;
    cart.save().await?;

    if let Some(line) = &removed {
        add_breadcrumb("cart", "Removed item", Some(&[("key", line.key.as_str())]));
    }

    Ok(Json(CartUpdate {
        key: removed.map(|line| line.key),
        quantity: None,
        cart: CartView::new(&cart, state.config().currency),
    }))
}

/// Take one unit off a line.
#[instrument(skip(state, cart, body))]
pub async fn decrease(
    State(state): State<AppState>,
    mut cart: SessionCart,
    Json(body): Json<TargetBody>,
) -> Result<Json<CartUpdate>> {
    let target = CartTarget::from(body);
    let key = match &target {
        CartTarget::Key(key) => Some(key.clone()),
        CartTarget::Product(product) => ekocart_core::cart::resolve_key(product).ok(),
    };

    let remaining = cart.store_mut().decrement(target)?;
    cart.save().await?;

    Ok(Json(CartUpdate {
        key,
        quantity: remaining.map(std::num::NonZeroU32::get),
        cart: CartView::new(&cart, state.config().currency),
    }))
}
