//! Checkout route handlers.
//!
//! Orders are validated and confirmed but not sent anywhere; payment is out
//! of scope for the storefront.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::middleware::SessionCart;
use crate::services::checkout::{
    self, CheckoutForm, Country, CouponOutcome, OrderConfirmation, OrderSummary, PaymentMethod,
};
use crate::state::AppState;

/// A selectable country.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountryOption {
    pub code: &'static str,
    pub name: &'static str,
}

/// Checkout page response.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub summary: OrderSummary,
    pub countries: Vec<CountryOption>,
    pub payment_methods: Vec<&'static str>,
}

/// Display the order summary and form options.
#[instrument(skip(state, cart))]
pub async fn show(State(state): State<AppState>, cart: SessionCart) -> Json<CheckoutView> {
    let config = state.config();

    Json(CheckoutView {
        summary: OrderSummary::from_cart(cart.cart(), config.shipping_flat, config.currency),
        countries: Country::ALL
            .iter()
            .map(|c| CountryOption {
                code: c.code(),
                name: c.name(),
            })
            .collect(),
        payment_methods: PaymentMethod::ALL.iter().map(|m| m.label()).collect(),
    })
}

/// Validate the form and place the order.
#[instrument(skip(state, cart, form))]
pub async fn submit(
    State(state): State<AppState>,
    cart: SessionCart,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, Json<OrderConfirmation>)> {
    let config = state.config();
    let confirmation = checkout::submit(&form, cart.cart(), config.shipping_flat, config.currency)?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("reference", &confirmation.reference.to_string())]),
    );

    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// Body of a coupon request.
#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    #[serde(default)]
    pub code: String,
}

/// Record a coupon request.
#[instrument(skip(body))]
pub async fn coupon(Json(body): Json<CouponRequest>) -> Json<CouponOutcome> {
    Json(checkout::apply_coupon(&body.code))
}
