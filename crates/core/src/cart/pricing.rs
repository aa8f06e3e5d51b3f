//! Cart totals.
//!
//! Prices arrive as numbers or as display strings from several sources, so a
//! line whose price cannot be read still counts, just at zero. Every such line
//! is reported as a [`PriceParseWarning`] next to the amount.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use super::{Cart, LineItem, LineItemKey};
use crate::types::PriceParseError;

/// A line whose price did not contribute to the subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("line {key} has no usable price ({reason})")]
pub struct PriceParseWarning {
    /// The affected line.
    pub key: LineItemKey,
    /// The price as it was stored, if there was one.
    pub raw: Option<String>,
    /// Why it was skipped.
    pub reason: String,
}

/// Sum of `unit price x quantity` over all lines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Subtotal {
    pub amount: Decimal,
    pub warnings: Vec<PriceParseWarning>,
}

impl Subtotal {
    /// True when every line had a readable price.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Unit price of a line, or the warning explaining why it has none.
///
/// # Errors
///
/// Returns a [`PriceParseWarning`] when the price is missing or unreadable.
pub fn unit_price(item: &LineItem) -> Result<Decimal, PriceParseWarning> {
    let Some(price) = item.product.price.as_ref() else {
        return Err(PriceParseWarning {
            key: item.key.clone(),
            raw: None,
            reason: "missing price".to_string(),
        });
    };

    price.amount().map_err(|e: PriceParseError| PriceParseWarning {
        key: item.key.clone(),
        raw: Some(price.to_string()),
        reason: e.to_string(),
    })
}

/// Unit price times quantity, or the warning explaining why the line has no
/// usable total.
///
/// # Errors
///
/// Returns a [`PriceParseWarning`] when the price is missing or unreadable, or
/// when the product does not fit in a [`Decimal`].
pub fn checked_line_total(item: &LineItem) -> Result<Decimal, PriceParseWarning> {
    let price = unit_price(item)?;
    price
        .checked_mul(Decimal::from(item.quantity.get()))
        .ok_or_else(|| out_of_range(item))
}

/// Total for one line: unit price times quantity, zero if the price is unusable.
#[must_use]
pub fn line_total(item: &LineItem) -> Decimal {
    checked_line_total(item).unwrap_or(Decimal::ZERO)
}

/// Compute the cart subtotal.
///
/// Never fails: unusable prices count as zero and are listed in
/// [`Subtotal::warnings`]. A line that would push the sum past
/// [`Decimal::MAX`] is treated the same way.
#[must_use]
pub fn subtotal(cart: &Cart) -> Subtotal {
    let mut total = Subtotal::default();

    for item in cart.items() {
        let line = checked_line_total(item).and_then(|amount| {
            total
                .amount
                .checked_add(amount)
                .ok_or_else(|| out_of_range(item))
        });

        match line {
            Ok(sum) => total.amount = sum,
            Err(warning) => {
                warn!(
                    key = %warning.key,
                    raw = warning.raw.as_deref().unwrap_or(""),
                    reason = %warning.reason,
                    "Cart line priced at zero"
                );
                total.warnings.push(warning);
            }
        }
    }

    total
}

fn out_of_range(item: &LineItem) -> PriceParseWarning {
    PriceParseWarning {
        key: item.key.clone(),
        raw: item.product.price.as_ref().map(ToString::to_string),
        reason: "amount out of range".to_string(),
    }
}

/// Amounts shown on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl CheckoutTotals {
    /// Totals with a flat shipping charge.
    ///
    /// The total saturates at [`Decimal::MAX`].
    #[must_use]
    pub fn with_flat_shipping(subtotal: Decimal, shipping: Decimal) -> Self {
        Self {
            subtotal,
            shipping,
            total: subtotal.saturating_add(shipping),
        }
    }

    /// Totals for a cart, with free shipping.
    #[must_use]
    pub fn for_cart(cart: &Cart) -> Self {
        Self::with_flat_shipping(subtotal(cart).amount, Decimal::ZERO)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;

    use super::*;
    use crate::cart::resolve_key;
    use crate::types::ProductReference;

    fn cart_of(lines: Vec<(ProductReference, u32)>) -> Cart {
        let items = lines
            .into_iter()
            .map(|(product, quantity)| LineItem {
                key: resolve_key(&product).unwrap(),
                product,
                quantity: NonZeroU32::new(quantity).unwrap(),
            })
            .collect::<Vec<_>>();
        let mut cart = Cart::new();
        for item in items {
            cart.push(item);
        }
        cart
    }

    #[test]
    fn test_subtotal_of_display_prices() {
        let cart = cart_of(vec![
            (ProductReference::named("A").with_price("₹1,000"), 2),
            (ProductReference::named("B").with_price("₹250"), 1),
        ]);

        let subtotal = subtotal(&cart);
        assert_eq!(subtotal.amount, Decimal::new(2250, 0));
        assert!(subtotal.is_exact());
    }

    #[test]
    fn test_subtotal_mixes_numeric_and_text() {
        let cart = cart_of(vec![
            (ProductReference::named("Backpack").with_id(1_i64).with_price(109.95), 2),
            (ProductReference::named("Lamp").with_price("$19.99"), 1),
        ]);

        assert_eq!(subtotal(&cart).amount, Decimal::new(23989, 2));
    }

    #[test]
    fn test_unreadable_price_contributes_zero() {
        let cart = cart_of(vec![
            (ProductReference::named("A").with_price("₹500"), 1),
            (ProductReference::named("B").with_price("Not Available"), 3),
            (ProductReference::named("C"), 1),
        ]);

        let subtotal = subtotal(&cart);
        assert_eq!(subtotal.amount, Decimal::new(500, 0));
        assert_eq!(subtotal.warnings.len(), 2);
        assert_eq!(subtotal.warnings[0].key.as_str(), "item:B||");
        assert_eq!(subtotal.warnings[0].raw.as_deref(), Some("Not Available"));
        assert_eq!(subtotal.warnings[1].raw, None);
    }

    #[test]
    fn test_empty_cart() {
        let subtotal = subtotal(&Cart::new());
        assert_eq!(subtotal.amount, Decimal::ZERO);
        assert!(subtotal.is_exact());
    }

    #[test]
    fn test_line_total() {
        let cart = cart_of(vec![(ProductReference::named("A").with_price("₹1,000"), 3)]);
        assert_eq!(line_total(&cart.items()[0]), Decimal::new(3000, 0));
    }

    #[test]
    fn test_overflowing_line_counts_as_zero() {
        let cart = cart_of(vec![
            (ProductReference::named("Big").with_price("79228162514264337593543950335"), 2),
            (ProductReference::named("Small").with_price("₹250"), 1),
        ]);

        assert_eq!(line_total(&cart.items()[0]), Decimal::ZERO);

        let subtotal = subtotal(&cart);
        assert_eq!(subtotal.amount, Decimal::new(250, 0));
        assert_eq!(subtotal.warnings.len(), 1);
        assert_eq!(subtotal.warnings[0].reason, "amount out of range");
        assert_eq!(
            subtotal.warnings[0].raw.as_deref(),
            Some("79228162514264337593543950335")
        );
    }

    #[test]
    fn test_overflowing_sum_skips_the_line() {
        let cart = cart_of(vec![
            (ProductReference::named("A").with_price("50000000000000000000000000000"), 1),
            (ProductReference::named("B").with_price("50000000000000000000000000000"), 1),
            (ProductReference::named("C").with_price("₹10"), 1),
        ]);

        let subtotal = subtotal(&cart);
        assert_eq!(
            subtotal.amount,
            Decimal::from_str_exact("50000000000000000000000000010").unwrap()
        );
        assert_eq!(subtotal.warnings.len(), 1);
        assert_eq!(subtotal.warnings[0].key.as_str(), "item:B|50000000000000000000000000000|");

        let totals = CheckoutTotals::with_flat_shipping(Decimal::MAX, Decimal::new(10, 0));
        assert_eq!(totals.total, Decimal::MAX);
    }

    #[test]
    fn test_checkout_totals() {
        let totals = CheckoutTotals::with_flat_shipping(Decimal::new(2250, 0), Decimal::new(50, 0));
        assert_eq!(totals.total, Decimal::new(2300, 0));

        let cart = cart_of(vec![(ProductReference::named("A").with_price("₹10"), 2)]);
        let free = CheckoutTotals::for_cart(&cart);
        assert_eq!(free.shipping, Decimal::ZERO);
        assert_eq!(free.total, Decimal::new(20, 0));
    }
}
