//! Local cart commands.
//!
//! # Usage
//!
//! ```bash
//! # Add a catalog product by id
//! ekocart cart add --catalog-id 3
//!
//! # Add a marketplace listing
//! ekocart cart add --name "Revolution 6" --price "₹2,999" --website Flipkart
//!
//! # Take one unit off, or remove the line
//! ekocart cart decrease --key id:3
//! ekocart cart remove --name "Revolution 6" --price "₹2,999" --website Flipkart
//!
//! ekocart cart show
//! ```
//!
//! # Environment Variables
//!
//! - `EKOCART_CART_FILE` - Cart file (default `.ekocart/cart.json`)

use std::io::Write;

use clap::Args;
use ekocart_core::cart::{CartStore, CartTarget, InvalidProductError, LineItemKey, line_total};
use ekocart_core::{CurrencyCode, Money, PriceInput, ProductIdentifier, ProductReference};
use ekocart_storefront::catalog::{CatalogClient, CatalogError};
use thiserror::Error;

use crate::file_storage::FileStorage;

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// The product cannot become a cart line.
    #[error("couldn't add item: {0}")]
    InvalidProduct(#[from] InvalidProductError),

    /// `--json` was not a product reference.
    #[error("Invalid product JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Writing the output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Product given as individual flags.
#[derive(Debug, Clone, Default, Args)]
pub struct ProductArgs {
    /// Product name
    #[arg(long)]
    pub name: Option<String>,

    /// Product identifier
    #[arg(long)]
    pub id: Option<String>,

    /// Unit price, numeric or currency-formatted ("₹2,999")
    #[arg(long)]
    pub price: Option<String>,

    /// Marketplace the listing is from
    #[arg(long)]
    pub website: Option<String>,

    /// Brand name
    #[arg(long)]
    pub brand: Option<String>,
}

impl ProductArgs {
    fn into_reference(self) -> ProductReference {
        ProductReference {
            id: self.id.map(|id| {
                id.trim()
                    .parse::<i64>()
                    .map_or(ProductIdentifier::Text(id), ProductIdentifier::Number)
            }),
            name: self.name,
            price: self.price.map(PriceInput::Text),
            website: self.website,
            brand: self.brand,
            ..ProductReference::default()
        }
    }
}

/// Arguments of `cart add`.
#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// Fetch the product from the catalog by id
    #[arg(long, conflicts_with_all = ["json", "name", "id"])]
    pub catalog_id: Option<i64>,

    /// Product reference as JSON
    #[arg(long, conflicts_with_all = ["name", "id"])]
    pub json: Option<String>,

    #[command(flatten)]
    pub product: ProductArgs,
}

/// Arguments of `cart remove` and `cart decrease`.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Line key as shown by `cart show`
    #[arg(long, conflicts_with_all = ["name", "id"])]
    pub key: Option<String>,

    #[command(flatten)]
    pub product: ProductArgs,
}

impl TargetArgs {
    fn into_target(self) -> CartTarget {
        match self.key {
            Some(key) => CartTarget::Key(LineItemKey::new(key)),
            None => CartTarget::Product(self.product.into_reference()),
        }
    }
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns an error if the product cannot be identified or fetched.
pub async fn add(
    storage: FileStorage,
    catalog: &CatalogClient,
    args: AddArgs,
    out: &mut impl Write,
) -> Result<(), CartCommandError> {
    let product = match (args.catalog_id, args.json) {
        (Some(id), _) => catalog.get_product(id).await?.to_reference(),
        (None, Some(json)) => serde_json::from_str(&json)?,
        (None, None) => args.product.into_reference(),
    };

    let mut store = CartStore::restore(storage);
    let line = store.add_or_increment(product)?;

    tracing::info!(key = %line.key, "Added to cart");
    writeln!(
        out,
        "{} x{} ({})",
        line.product.display_name().unwrap_or_default(),
        line.quantity,
        line.key
    )?;
    Ok(())
}

/// Remove a line entirely.
///
/// # Errors
///
/// Returns an error if the target product cannot be identified.
pub fn remove(
    storage: FileStorage,
    args: TargetArgs,
    out: &mut impl Write,
) -> Result<(), CartCommandError> {
    let mut store = CartStore::restore(storage);

    match store.remove(args.into_target())? {
        Some(line) => writeln!(out, "Removed {}", line.key)?,
        None => writeln!(out, "Not in cart")?,
    }
    Ok(())
}

/// Take one unit off a line.
///
/// # Errors
///
/// Returns an error if the target product cannot be identified.
pub fn decrease(
    storage: FileStorage,
    args: TargetArgs,
    out: &mut impl Write,
) -> Result<(), CartCommandError> {
    let mut store = CartStore::restore(storage);
    let key = args.into_target().key()?;

    if store.cart().find(&key).is_none() {
        writeln!(out, "Not in cart")?;
        return Ok(());
    }

    match store.decrement(&key)? {
        Some(remaining) => writeln!(out, "{remaining} left")?,
        None => writeln!(out, "Removed {key}")?,
    }
    Ok(())
}

/// Print the cart.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn show(
    storage: FileStorage,
    currency: CurrencyCode,
    out: &mut impl Write,
) -> Result<(), CartCommandError> {
    let store = CartStore::restore(storage);

    if store.cart().is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }

    for item in store.snapshot() {
        writeln!(
            out,
            "{:>3} x {:<40} {:>12}  {}",
            item.quantity,
            item.product.display_name().unwrap_or_default(),
            Money::new(line_total(item), currency).display(),
            item.key
        )?;
    }

    let subtotal = store.subtotal();
    writeln!(
        out,
        "{} items, subtotal {}",
        store.item_count(),
        Money::new(subtotal.amount, currency).display()
    )?;
    for warning in &subtotal.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn storage(dir: &tempfile::TempDir) -> FileStorage {
        FileStorage::new(dir.path().join("cart.json"))
    }

    fn shoe() -> ProductArgs {
        ProductArgs {
            name: Some("Shoe".to_string()),
            price: Some("₹999".to_string()),
            website: Some("A".to_string()),
            ..ProductArgs::default()
        }
    }

    fn offline_catalog() -> CatalogClient {
        CatalogClient::new(&ekocart_storefront::config::CatalogConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_product_args_parse_numeric_id() {
        let reference = ProductArgs {
            name: Some("Backpack".to_string()),
            id: Some("1".to_string()),
            ..ProductArgs::default()
        }
        .into_reference();
        assert_eq!(reference.id, Some(ProductIdentifier::Number(1)));

        let reference = ProductArgs {
            id: Some("sku-42".to_string()),
            ..ProductArgs::default()
        }
        .into_reference();
        assert_eq!(
            reference.id,
            Some(ProductIdentifier::Text("sku-42".to_string()))
        );
    }

    #[tokio::test]
    async fn test_add_show_decrease() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = offline_catalog();
        let mut out = Vec::new();

        for _ in 0..2 {
            let args = AddArgs {
                catalog_id: None,
                json: None,
                product: shoe(),
            };
            add(storage(&dir), &catalog, args, &mut out).await.unwrap();
        }

        let mut shown = Vec::new();
        show(storage(&dir), CurrencyCode::INR, &mut shown).unwrap();
        let shown = String::from_utf8(shown).unwrap();
        assert!(shown.contains("2 items, subtotal ₹1998.00"));

        let mut out = Vec::new();
        let target = TargetArgs {
            key: None,
            product: shoe(),
        };
        decrease(storage(&dir), target, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1 left\n");

        let mut out = Vec::new();
        let target = TargetArgs {
            key: None,
            product: shoe(),
        };
        decrease(storage(&dir), target, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Removed item:Shoe|999|A\n");
    }

    #[test]
    fn test_decrease_absent_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CartStore::restore(storage(&dir));
        store
            .add_or_increment(ProductReference::named("Backpack").with_id(1_i64))
            .unwrap();

        let mut out = Vec::new();
        let target = TargetArgs {
            key: Some("id:999".to_string()),
            product: ProductArgs::default(),
        };
        decrease(storage(&dir), target, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Not in cart\n");

        let mut shown = Vec::new();
        show(storage(&dir), CurrencyCode::USD, &mut shown).unwrap();
        assert!(String::from_utf8(shown).unwrap().contains("1 items"));
    }

    #[tokio::test]
    async fn test_add_nameless_product_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = AddArgs {
            catalog_id: None,
            json: Some(r#"{"price": 5}"#.to_string()),
            product: ProductArgs::default(),
        };

        let result = add(storage(&dir), &offline_catalog(), args, &mut Vec::new()).await;
        assert!(matches!(result, Err(CartCommandError::InvalidProduct(_))));
    }

    #[test]
    fn test_remove_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CartStore::restore(storage(&dir));
        store
            .add_or_increment(ProductReference::named("Backpack").with_id(1_i64))
            .unwrap();

        let mut out = Vec::new();
        let target = TargetArgs {
            key: Some("id:1".to_string()),
            product: ProductArgs::default(),
        };
        remove(storage(&dir), target, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Removed id:1\n");

        let mut shown = Vec::new();
        show(storage(&dir), CurrencyCode::USD, &mut shown).unwrap();
        assert_eq!(String::from_utf8(shown).unwrap(), "Cart is empty\n");
    }
}
