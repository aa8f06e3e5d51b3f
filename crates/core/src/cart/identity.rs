//! Line-item identity.
//!
//! Two policies, picked by which fields the reference carries:
//!
//! - a product with an identifier is keyed by that identifier (`id:<id>`)
//! - a product without one is keyed by name, normalized price and source site
//!   (`item:<name>|<price>|<site>`)
//!
//! `\` and `|` inside the name and site are backslash-escaped, so a separator
//! in a display name cannot shift text into the next segment.
//!
//! The composite form exists for marketplace listings, where the same product
//! arrives from several sites and has no stable id. Prices are compared as
//! numbers, so `"₹999"`, `"999"` and `999.0` produce the same key.

use std::borrow::Cow;

use rust_decimal::Decimal;

use super::{InvalidProductError, LineItemKey};
use crate::types::{PriceInput, ProductReference};

/// Derive the line-item key for a product.
///
/// Deterministic and side-effect free.
///
/// # Errors
///
/// Returns [`InvalidProductError::MissingDisplayName`] if the product has no
/// display name, whichever policy would otherwise apply.
pub fn resolve_key(product: &ProductReference) -> Result<LineItemKey, InvalidProductError> {
    let name = product
        .display_name()
        .ok_or(InvalidProductError::MissingDisplayName)?;

    if let Some(id) = product.id.as_ref().filter(|id| !id.is_blank()) {
        return Ok(LineItemKey::new(format!("id:{id}")));
    }

    let price = product
        .price
        .as_ref()
        .and_then(normalized_price)
        .map(|amount| amount.to_string())
        .unwrap_or_default();
    let site = product.website.as_deref().map_or("", str::trim);

    Ok(LineItemKey::new(format!(
        "item:{}|{price}|{}",
        escape_segment(name),
        escape_segment(site)
    )))
}

fn escape_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains(['\\', '|']) {
        Cow::Owned(segment.replace('\\', "\\\\").replace('|', "\\|"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Canonical numeric form of a price, without trailing zeros.
///
/// Unparseable prices yield `None` and contribute an empty price segment.
fn normalized_price(price: &PriceInput) -> Option<Decimal> {
    price.amount().ok().map(|amount| amount.normalize())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_policy() {
        let product = ProductReference::named("Backpack")
            .with_id(1_i64)
            .with_price(109.95);
        assert_eq!(resolve_key(&product).unwrap().as_str(), "id:1");
    }

    #[test]
    fn test_numeric_and_text_identifier_match() {
        let numeric = ProductReference::named("Backpack").with_id(7_i64);
        let text = ProductReference::named("Backpack").with_id("7");
        assert_eq!(resolve_key(&numeric), resolve_key(&text));
    }

    #[test]
    fn test_identifier_ignores_price_and_site() {
        let a = ProductReference::named("Backpack").with_id(1_i64).with_price(10.0);
        let b = ProductReference::named("Backpack v2")
            .with_id(1_i64)
            .with_price(12.0)
            .with_website("B");
        assert_eq!(resolve_key(&a), resolve_key(&b));
    }

    #[test]
    fn test_composite_policy() {
        let product = ProductReference::named("Shoe")
            .with_price("₹12,999")
            .with_website("Amazon");
        assert_eq!(
            resolve_key(&product).unwrap().as_str(),
            "item:Shoe|12999|Amazon"
        );
    }

    #[test]
    fn test_composite_price_compared_numerically() {
        let text = ProductReference::named("Shoe")
            .with_price("₹999")
            .with_website("A");
        let plain = ProductReference::named("Shoe")
            .with_price("999")
            .with_website("A");
        let numeric = ProductReference::named("Shoe")
            .with_price(999.0)
            .with_website("A");
        let padded = ProductReference::named("Shoe")
            .with_price("999.00")
            .with_website("A");

        let key = resolve_key(&text).unwrap();
        assert_eq!(resolve_key(&plain).unwrap(), key);
        assert_eq!(resolve_key(&numeric).unwrap(), key);
        assert_eq!(resolve_key(&padded).unwrap(), key);
    }

    #[test]
    fn test_composite_distinguishes_sites() {
        let a = ProductReference::named("Shoe")
            .with_price("₹999")
            .with_website("Amazon");
        let b = ProductReference::named("Shoe")
            .with_price("₹999")
            .with_website("Flipkart");
        assert_ne!(resolve_key(&a), resolve_key(&b));
    }

    #[test]
    fn test_blank_identifier_falls_back_to_composite() {
        let product = ProductReference::named("Shoe").with_id("  ").with_price("₹5");
        assert_eq!(resolve_key(&product).unwrap().as_str(), "item:Shoe|5|");
    }

    #[test]
    fn test_unparseable_price_keeps_empty_segment() {
        let product = ProductReference::named("Shoe")
            .with_price("Not Available")
            .with_website("A");
        assert_eq!(resolve_key(&product).unwrap().as_str(), "item:Shoe||A");
    }

    #[test]
    fn test_separator_in_name_or_site_cannot_collide() {
        let piped_name = ProductReference::named("Shoe|5").with_website("A");
        let piped_site = ProductReference::named("Shoe")
            .with_price(5.0)
            .with_website("|A");

        let a = resolve_key(&piped_name).unwrap();
        let b = resolve_key(&piped_site).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), r"item:Shoe\|5||A");
        assert_eq!(b.as_str(), r"item:Shoe|5|\|A");
    }

    #[test]
    fn test_backslash_is_escaped() {
        let trailing = ProductReference::named(r"Shoe\").with_website("|A");
        let plain = ProductReference::named("Shoe").with_website(r"\|A");
        assert_ne!(resolve_key(&trailing), resolve_key(&plain));
        assert_eq!(resolve_key(&trailing).unwrap().as_str(), r"item:Shoe\\||\|A");
    }

    #[test]
    fn test_missing_name_is_invalid() {
        let product = ProductReference::default().with_id(3_i64);
        assert_eq!(
            resolve_key(&product),
            Err(InvalidProductError::MissingDisplayName)
        );
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let product = ProductReference::named("Lamp")
            .with_price("$19.99")
            .with_website("Store");
        assert_eq!(resolve_key(&product), resolve_key(&product));
    }
}
