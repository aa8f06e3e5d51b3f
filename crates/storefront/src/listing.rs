//! Listing filters and pagination for the catalog and search pages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogProduct;
use crate::search::MarketplaceProduct;

/// Products shown per page.
pub const ITEMS_PER_PAGE: usize = 12;

/// Page numbers shown in the pager at most.
pub const PAGE_WINDOW: usize = 5;

/// Upper end of the default marketplace price range.
pub const DEFAULT_MAX_PRICE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Catalog listing filter: exact category, case-insensitive title substring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFilter {
    pub category: Option<String>,
    #[serde(alias = "q")]
    pub query: Option<String>,
}

impl CatalogFilter {
    #[must_use]
    pub fn matches(&self, product: &CatalogProduct) -> bool {
        if let Some(category) = non_blank(self.category.as_deref())
            && product.category != category
        {
            return false;
        }

        if let Some(query) = non_blank(self.query.as_deref()) {
            return product
                .title
                .to_lowercase()
                .contains(&query.to_lowercase());
        }

        true
    }

    /// Products passing the filter, in catalog order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [CatalogProduct]) -> Vec<&'a CatalogProduct> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Marketplace search filter.
///
/// The category is matched against the brand, as a case-insensitive
/// substring. Products without a readable price count as zero.
#[derive(Debug, Clone)]
pub struct MarketplaceFilter {
    pub category: Option<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub brands: Vec<String>,
}

impl Default for MarketplaceFilter {
    fn default() -> Self {
        Self {
            category: None,
            min_price: Decimal::ZERO,
            max_price: DEFAULT_MAX_PRICE,
            brands: Vec::new(),
        }
    }
}

impl MarketplaceFilter {
    #[must_use]
    pub fn matches(&self, product: &MarketplaceProduct) -> bool {
        if let Some(category) = non_blank(self.category.as_deref())
            && !product
                .brand
                .to_lowercase()
                .contains(&category.to_lowercase())
        {
            return false;
        }

        let price = product.effective_price().unwrap_or(Decimal::ZERO);
        if price < self.min_price || price > self.max_price {
            return false;
        }

        self.brands.is_empty() || self.brands.iter().any(|b| b == &product.brand)
    }

    /// Products passing the filter, in result order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [MarketplaceProduct]) -> Vec<&'a MarketplaceProduct> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Distinct brands in first-seen order, for the brand filter.
#[must_use]
pub fn unique_brands(products: &[MarketplaceProduct]) -> Vec<String> {
    let mut brands: Vec<String> = Vec::new();
    for product in products {
        if !product.brand.is_empty() && !brands.contains(&product.brand) {
            brands.push(product.brand.clone());
        }
    }
    brands
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    /// At least one, even for an empty listing.
    pub total_pages: usize,
    /// Page numbers to show in the pager.
    pub window: Vec<usize>,
}

/// Slice out one page. Out-of-range pages are clamped to the first or last.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let items = items.iter().skip(start).take(per_page).cloned().collect();

    Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
        window: page_window(page, total_pages),
    }
}

/// Up to [`PAGE_WINDOW`] page numbers around the current page.
///
/// Near either end the window is pinned to that end, so it always shows five
/// pages when there are at least five.
#[must_use]
pub fn page_window(current: usize, total: usize) -> Vec<usize> {
    if total <= PAGE_WINDOW {
        return (1..=total).collect();
    }

    let half = PAGE_WINDOW / 2;
    let start = if current <= half + 1 {
        1
    } else if current + half >= total {
        total + 1 - PAGE_WINDOW
    } else {
        current - half
    };

    (start..start + PAGE_WINDOW).collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
