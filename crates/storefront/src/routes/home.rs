//! Catalog route handlers: the home listing, product detail and categories.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use ekocart_core::ProductReference;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::CatalogProduct;
use crate::error::Result;
use crate::listing::{CatalogFilter, ITEMS_PER_PAGE, Page, paginate};
use crate::state::AppState;

/// Query parameters of the home listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub page: Option<usize>,
}

/// Home listing response.
#[derive(Debug, Serialize)]
pub struct ListingView {
    pub products: Page<CatalogProduct>,
    pub categories: Arc<Vec<String>>,
    pub category: Option<String>,
    pub query: Option<String>,
}

/// Product detail response.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub product: CatalogProduct,
    /// Reference to post to `/cart/add`.
    pub reference: ProductReference,
}

/// Display the catalog listing.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingView>> {
    let products = state.catalog().list_products().await?;
    let categories = state.catalog().list_categories().await?;

    let filter = CatalogFilter {
        category: query.category.clone(),
        query: query.q.clone(),
    };
    let matching: Vec<CatalogProduct> = filter.apply(&products).into_iter().cloned().collect();

    Ok(Json(ListingView {
        products: paginate(&matching, query.page.unwrap_or(1), ITEMS_PER_PAGE),
        categories,
        category: filter.category,
        query: filter.query,
    }))
}

/// Display a single catalog product.
#[instrument(skip(state))]
pub async fn product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductView>> {
    let product = state.catalog().get_product(id).await?;

    Ok(Json(ProductView {
        reference: product.to_reference(),
        product,
    }))
}

/// List the catalog categories.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Arc<Vec<String>>>> {
    Ok(Json(state.catalog().list_categories().await?))
}
