//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! ekocart catalog list --category electronics --query ssd --page 2
//! ekocart catalog categories
//! ```
//!
//! # Environment Variables
//!
//! - `CATALOG_API_URL` - Catalog API base URL (default `https://fakestoreapi.com`)

use std::io::Write;

use ekocart_core::{CurrencyCode, Money, PriceInput};
use ekocart_storefront::catalog::{CatalogClient, CatalogError, CatalogProduct};
use ekocart_storefront::listing::{CatalogFilter, ITEMS_PER_PAGE, paginate};
use thiserror::Error;

/// Errors that can occur during catalog commands.
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Print one page of the catalog listing.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn list(
    catalog: &CatalogClient,
    filter: &CatalogFilter,
    page: usize,
    currency: CurrencyCode,
    out: &mut impl Write,
) -> Result<(), CatalogCommandError> {
    let products = catalog.list_products().await?;
    let matching: Vec<CatalogProduct> = filter.apply(&products).into_iter().cloned().collect();
    let page = paginate(&matching, page, ITEMS_PER_PAGE);

    for product in &page.items {
        let price = PriceInput::Amount(product.price)
            .amount()
            .map_or_else(|_| "-".to_string(), |a| Money::new(a, currency).display());
        writeln!(
            out,
            "{:>4}  {:<50} {:>10}  {}",
            product.id, product.title, price, product.category
        )?;
    }

    writeln!(
        out,
        "page {}/{} ({} products)",
        page.page, page.total_pages, page.total_items
    )?;
    Ok(())
}

/// Print the catalog categories.
///
/// # Errors
///
/// Returns an error if the catalog cannot be fetched.
pub async fn categories(
    catalog: &CatalogClient,
    out: &mut impl Write,
) -> Result<(), CatalogCommandError> {
    for category in catalog.list_categories().await?.iter() {
        writeln!(out, "{category}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ekocart_storefront::config::CatalogConfig;

    use super::*;

    async fn primed() -> CatalogClient {
        let client = CatalogClient::new(&CatalogConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            ..CatalogConfig::default()
        })
        .unwrap();

        let product = |id: i64, title: &str, category: &str| CatalogProduct {
            id,
            title: title.to_string(),
            price: 12.5,
            description: String::new(),
            category: category.to_string(),
            image: String::new(),
            rating: None,
        };

        client
            .prime(vec![
                product(1, "Backpack", "men's clothing"),
                product(2, "Gold Ring", "jewelery"),
            ])
            .await;
        client
    }

    #[tokio::test]
    async fn test_list_filters_by_query() {
        let catalog = primed().await;
        let filter = CatalogFilter {
            category: None,
            query: Some("ring".to_string()),
        };

        let mut out = Vec::new();
        list(&catalog, &filter, 1, CurrencyCode::USD, &mut out)
            .await
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Gold Ring"));
        assert!(out.contains("$12.50"));
        assert!(!out.contains("Backpack"));
        assert!(out.ends_with("page 1/1 (1 products)\n"));
    }

    #[tokio::test]
    async fn test_categories() {
        let catalog = primed().await;
        let mut out = Vec::new();
        categories(&catalog, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "men's clothing\njewelery\n");
    }
}
