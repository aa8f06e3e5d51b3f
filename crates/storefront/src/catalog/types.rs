//! Catalog API response types.

use ekocart_core::{PriceInput, ProductIdentifier, ProductReference};
use serde::{Deserialize, Serialize};

/// A product as served by the catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: Option<CatalogRating>,
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogRating {
    pub rate: f64,
    pub count: u32,
}

impl CatalogProduct {
    /// The reference added to the cart for this product.
    ///
    /// Catalog products carry a stable id, so cart lines are keyed by it.
    #[must_use]
    pub fn to_reference(&self) -> ProductReference {
        ProductReference {
            id: Some(ProductIdentifier::Number(self.id)),
            name: Some(self.title.clone()),
            image: non_empty(&self.image),
            price: Some(PriceInput::Amount(self.price)),
            brand: None,
            website: None,
            description: non_empty(&self.description),
            category: non_empty(&self.category),
        }
    }
}

impl From<&CatalogProduct> for ProductReference {
    fn from(product: &CatalogProduct) -> Self {
        product.to_reference()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
