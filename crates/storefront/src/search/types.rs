//! Marketplace search wire types.

use ekocart_core::{PriceInput, ProductReference, parse_price};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A number the backend sends either as JSON number or as text
/// (`4.3`, `"4.3"`, `"Not Rated"`, `"1,024"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Numeric value, if there is one.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.is_finite().then_some(*n),
            Self::Text(text) => text.trim().replace(',', "").parse::<f64>().ok(),
        }
    }
}

/// One marketplace listing of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceVariant {
    /// Price as displayed by the marketplace, e.g. `"₹12,999"`.
    #[serde(default)]
    pub price: String,
    pub website: String,
    #[serde(default)]
    pub rating: Option<LooseNumber>,
    #[serde(default)]
    pub ratings_count: Option<LooseNumber>,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// A product grouped across marketplaces by the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketplaceProduct {
    /// Backend-generated id. Not stable across searches.
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    /// `"₹999"`, `"₹999 - ₹1,299"` or `"Not Available"`.
    #[serde(default)]
    pub price_display: String,
    #[serde(default)]
    pub best_price: Option<f64>,
    #[serde(default)]
    pub avg_rating: Option<LooseNumber>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub available_on: Vec<String>,
    #[serde(default)]
    pub variants: Vec<MarketplaceVariant>,
}

impl MarketplaceProduct {
    /// Price used for filtering: the best price, else the lower bound of the
    /// displayed range.
    #[must_use]
    pub fn effective_price(&self) -> Option<Decimal> {
        if let Some(best) = self.best_price
            && let Ok(amount) = PriceInput::Amount(best).amount()
        {
            return Some(amount);
        }

        let lower = self.price_display.split(" - ").next()?;
        parse_price(lower).ok()
    }

    /// The reference added to the cart for one variant.
    ///
    /// Carries no identifier: the same product arrives from several sites
    /// under ids that change between searches, so lines are keyed by name,
    /// price and site.
    #[must_use]
    pub fn variant_reference(&self, index: usize) -> Option<ProductReference> {
        let variant = self.variants.get(index)?;

        Some(ProductReference {
            id: None,
            name: Some(self.name.clone()),
            image: variant
                .thumbnail
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| self.thumbnail.clone()),
            price: Some(PriceInput::Text(variant.price.clone())),
            brand: (!self.brand.is_empty()).then(|| self.brand.clone()),
            website: Some(variant.website.clone()),
            description: None,
            category: None,
        })
    }

    /// Links of all variants, for a details lookup.
    #[must_use]
    pub fn variant_links(&self) -> Vec<String> {
        self.variants
            .iter()
            .filter(|v| !v.link.is_empty())
            .map(|v| v.link.clone())
            .collect()
    }
}

/// Body of `POST /api/search`.
#[derive(Debug, Serialize)]
pub(super) struct SearchRequest<'a> {
    pub query: &'a str,
}

/// Response of `POST /api/search`: products on success, an error message otherwise.
#[derive(Debug, Deserialize)]
pub(super) struct SearchResponse {
    #[serde(default)]
    pub products: Option<Vec<MarketplaceProduct>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/product_details`.
#[derive(Debug, Serialize)]
pub(super) struct VariantDetailsRequest<'a> {
    pub links: &'a [String],
}

/// Response of `POST /api/product_details`.
#[derive(Debug, Deserialize)]
pub(super) struct VariantDetailsResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<VariantDetail>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Ratings scraped from one variant link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantDetail {
    #[serde(default)]
    pub rating: Option<LooseNumber>,
    #[serde(default)]
    pub ratings_count: Option<LooseNumber>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/recommendations/content`.
#[derive(Debug, Serialize)]
pub(super) struct RecommendationRequest<'a> {
    pub product_id: &'a str,
    pub top_n: usize,
    pub search_results: &'a [MarketplaceProduct],
}
