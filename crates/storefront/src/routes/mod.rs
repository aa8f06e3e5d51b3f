//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog reachable)
//!
//! # Catalog
//! GET  /                       - Listing (?q, ?category, ?page)
//! GET  /products/{id}          - Product detail
//! GET  /categories             - Category list
//!
//! # Marketplace search
//! GET  /search                 - Search (?q, ?category, ?min_price, ?max_price, ?brand, ?page)
//! POST /search/details         - Ratings for variant links
//! POST /search/recommendations - Similar products
//!
//! # Cart
//! GET  /cart                   - Cart page
//! GET  /cart/sidebar           - Sidebar contents
//! GET  /cart/count             - Item count badge
//! POST /cart/add               - Add one unit (body: product reference)
//! POST /cart/remove            - Remove a line (body: {key} or {product})
//! POST /cart/decrease          - Remove one unit (body: {key} or {product})
//!
//! # Checkout
//! GET  /checkout               - Order summary
//! POST /checkout               - Place order
//! POST /checkout/coupon        - Coupon request
//!
//! # Auth
//! GET  /signin                 - Sign-in page
//! POST /signin                 - Sign-in action
//! GET  /signup                 - Sign-up page
//! POST /signup                 - Sign-up action
//! POST /signout                - Sign-out action
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod search;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/sidebar", get(cart::sidebar))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/decrease", post(cart::decrease))
}

/// Create the search routes router.
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(search::search))
        .route("/details", post(search::details))
        .route("/recommendations", post(search::recommendations))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        // Catalog
        .route("/", get(home::home))
        .route("/products/{id}", get(home::product))
        .route("/categories", get(home::categories))
        // Marketplace search
        .nest("/search", search_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/checkout/coupon", post(checkout::coupon))
        // Auth
        .route("/signin", get(auth::signin_page).post(auth::signin))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/signout", post(auth::signout))
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog API cannot be reached.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().list_categories().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
