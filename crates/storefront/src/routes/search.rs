//! Marketplace search route handlers.

use axum::{
    Json,
    extract::{RawQuery, State},
};
use ekocart_core::ProductReference;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::listing::{ITEMS_PER_PAGE, MarketplaceFilter, Page, paginate, unique_brands};
use crate::search::{DEFAULT_RECOMMENDATIONS, MarketplaceProduct, VariantDetail};
use crate::state::AppState;

/// Parsed search query string. `brand` may repeat.
#[derive(Debug, Default)]
pub struct SearchParams {
    pub q: String,
    pub page: usize,
    pub filter: MarketplaceFilter,
}

impl SearchParams {
    /// Parse a raw query string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unreadable page or price bound.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let mut params = Self {
            page: 1,
            ..Self::default()
        };

        for (name, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let value = value.trim();
            match name.as_ref() {
                "q" => params.q = value.to_string(),
                "category" if !value.is_empty() => {
                    params.filter.category = Some(value.to_string());
                }
                "brand" if !value.is_empty() => params.filter.brands.push(value.to_string()),
                "min_price" if !value.is_empty() => {
                    params.filter.min_price = parse_bound(value, "min_price")?;
                }
                "max_price" if !value.is_empty() => {
                    params.filter.max_price = parse_bound(value, "max_price")?;
                }
                "page" if !value.is_empty() => {
                    params.page = value
                        .parse()
                        .map_err(|_| AppError::BadRequest(format!("invalid page: {value}")))?;
                }
                _ => {}
            }
        }

        Ok(params)
    }
}

fn parse_bound(value: &str, name: &str) -> Result<Decimal> {
    value
        .parse::<Decimal>()
        .map_err(|_| AppError::BadRequest(format!("invalid {name}: {value}")))
}

/// One search hit plus the cart reference for each of its variants.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub product: MarketplaceProduct,
    pub cart_references: Vec<ProductReference>,
}

impl From<&MarketplaceProduct> for SearchHit {
    fn from(product: &MarketplaceProduct) -> Self {
        Self {
            cart_references: (0..product.variants.len())
                .filter_map(|i| product.variant_reference(i))
                .collect(),
            product: product.clone(),
        }
    }
}

/// Search page response.
#[derive(Debug, Serialize)]
pub struct SearchView {
    pub query: String,
    pub total_results: usize,
    pub brands: Vec<String>,
    pub results: Page<SearchHit>,
}

/// Search every marketplace and filter the results.
#[instrument(skip(state, raw))]
pub async fn search(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<SearchView>> {
    let params = SearchParams::parse(raw.as_deref())?;
    let products = state.search().search(&params.q).await?;

    let hits: Vec<SearchHit> = params
        .filter
        .apply(&products)
        .into_iter()
        .map(SearchHit::from)
        .collect();

    tracing::info!(
        query = %params.q,
        found = products.len(),
        shown = hits.len(),
        "Marketplace search"
    );

    Ok(Json(SearchView {
        brands: unique_brands(&products),
        total_results: products.len(),
        results: paginate(&hits, params.page, ITEMS_PER_PAGE),
        query: params.q,
    }))
}

/// Body of the details lookup.
#[derive(Debug, Deserialize)]
pub struct DetailsRequest {
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DetailsView {
    pub results: Vec<VariantDetail>,
}

/// Ratings for a product's variant links.
#[instrument(skip(state, body), fields(links = body.links.len()))]
pub async fn details(
    State(state): State<AppState>,
    Json(body): Json<DetailsRequest>,
) -> Result<Json<DetailsView>> {
    let results = state.search().variant_details(&body.links).await?;
    Ok(Json(DetailsView { results }))
}

/// Body of a recommendations request.
#[derive(Debug, Deserialize)]
pub struct RecommendationsRequest {
    pub product_id: String,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub search_results: Vec<MarketplaceProduct>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsView {
    pub recommendations: Vec<SearchHit>,
}

/// Products similar to one of the current results.
#[instrument(skip(state, body), fields(product_id = %body.product_id))]
pub async fn recommendations(
    State(state): State<AppState>,
    Json(body): Json<RecommendationsRequest>,
) -> Result<Json<RecommendationsView>> {
    let recommendations = state
        .search()
        .content_recommendations(
            &body.product_id,
            body.top_n.unwrap_or(DEFAULT_RECOMMENDATIONS),
            &body.search_results,
        )
        .await?;

    Ok(Json(RecommendationsView {
        recommendations: recommendations.iter().map(SearchHit::from).collect(),
    }))
}
