//! Price parsing and money representation using decimal arithmetic.
//!
//! Catalog sources disagree on how a price is encoded: the product API sends a
//! plain JSON number, marketplace listings send currency-formatted text such as
//! `"₹12,999"` or `"$19.99"`. [`PriceInput`] keeps whichever form was received
//! and [`parse_price`] turns the text form into a [`Decimal`].
//!
//! ```
//! use ekocart_core::parse_price;
//! use rust_decimal::Decimal;
//!
//! assert_eq!(parse_price("₹12,999").unwrap(), Decimal::new(12999, 0));
//! assert_eq!(parse_price("$19.99").unwrap(), Decimal::new(1999, 2));
//! assert!(parse_price("Not Available").is_err());
//! ```

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when reading a price.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceParseError {
    /// The price text is empty or whitespace.
    #[error("price is empty")]
    Empty,
    /// The price text contains no digits (e.g. "Not Available").
    #[error("price has no numeric value: {0:?}")]
    NoDigits(String),
    /// The price text contains more than one number (e.g. a price range).
    #[error("price contains more than one amount: {0:?}")]
    Ambiguous(String),
    /// The digits do not form a decimal number.
    #[error("price is not a valid number: {0:?}")]
    Malformed(String),
    /// A numeric price that is negative, infinite or NaN.
    #[error("price is out of range: {0}")]
    OutOfRange(String),
}

/// Parse a currency-formatted price into a decimal amount.
///
/// Currency symbols, letters and thousands separators are stripped. A `.` is
/// only treated as the decimal point once a digit has been seen, so `"Rs. 99"`
/// parses as `99`. Text holding two separate amounts is rejected instead of
/// being glued together.
///
/// # Errors
///
/// Returns a [`PriceParseError`] when no single non-negative amount can be read.
pub fn parse_price(text: &str) -> Result<Decimal, PriceParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PriceParseError::Empty);
    }

    let mut digits = String::with_capacity(trimmed.len());
    let mut run_closed = false;

    for c in trimmed.chars() {
        match c {
            '0'..='9' => {
                if run_closed {
                    return Err(PriceParseError::Ambiguous(trimmed.to_string()));
                }
                digits.push(c);
            }
            '.' if !digits.is_empty() && !run_closed => digits.push(c),
            ',' if !digits.is_empty() && !run_closed => {}
            _ => {
                if !digits.is_empty() {
                    run_closed = true;
                }
            }
        }
    }

    if digits.is_empty() {
        return Err(PriceParseError::NoDigits(trimmed.to_string()));
    }

    let digits = digits.trim_end_matches('.');
    Decimal::from_str(digits).map_err(|_| PriceParseError::Malformed(trimmed.to_string()))
}

/// A price exactly as a catalog source supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    /// A plain number in the store currency.
    Amount(f64),
    /// Currency-formatted text.
    Text(String),
}

impl PriceInput {
    /// Returns the numeric amount of this price.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceParseError`] if the text cannot be parsed or the number
    /// is negative or not finite.
    pub fn amount(&self) -> Result<Decimal, PriceParseError> {
        match self {
            Self::Amount(value) => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(PriceParseError::OutOfRange(value.to_string()));
                }
                // Display gives the shortest round-trip form, so 19.99 stays 19.99
                Decimal::from_str(&value.to_string())
                    .map_err(|_| PriceParseError::OutOfRange(value.to_string()))
            }
            Self::Text(text) => parse_price(text),
        }
    }
}

impl fmt::Display for PriceInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for PriceInput {
    fn from(value: f64) -> Self {
        Self::Amount(value)
    }
}

impl From<&str> for PriceInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for PriceInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// An amount with the currency it is displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// Currency the amount is shown in.
    pub currency: CurrencyCode,
}

impl Money {
    /// Create a new money value.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Format for display (e.g., "₹2250.00").
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{}{rounded:.2}", self.currency.symbol())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    INR,
    EUR,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD => "$",
            Self::INR => "₹",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::INR => "INR",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
        }
    }
}

/// Error returned when a currency code is not supported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::USD),
            "INR" => Ok(Self::INR),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rupee_with_separators() {
        assert_eq!(parse_price("₹12,999").unwrap(), Decimal::new(12999, 0));
        assert_eq!(parse_price("₹1,000").unwrap(), Decimal::new(1000, 0));
    }

    #[test]
    fn test_parse_dollar_cents() {
        assert_eq!(parse_price("$19.99").unwrap(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_parse_plain_digits() {
        assert_eq!(parse_price("999").unwrap(), Decimal::new(999, 0));
        assert_eq!(parse_price("  250 ").unwrap(), Decimal::new(250, 0));
    }

    #[test]
    fn test_parse_abbreviation_dot_before_digits() {
        assert_eq!(parse_price("Rs. 99").unwrap(), Decimal::new(99, 0));
    }

    #[test]
    fn test_parse_trailing_text() {
        assert_eq!(parse_price("₹499 only").unwrap(), Decimal::new(499, 0));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse_price("   "), Err(PriceParseError::Empty));
    }

    #[test]
    fn test_parse_not_available() {
        assert!(matches!(
            parse_price("Not Available"),
            Err(PriceParseError::NoDigits(_))
        ));
    }

    #[test]
    fn test_parse_range_is_ambiguous() {
        assert!(matches!(
            parse_price("₹1,000 - ₹2,000"),
            Err(PriceParseError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_parse_double_decimal_point() {
        assert!(matches!(
            parse_price("12.99.1"),
            Err(PriceParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_amount_numeric_and_text_agree() {
        let numeric = PriceInput::Amount(999.0);
        let text = PriceInput::from("₹999");
        assert_eq!(numeric.amount().unwrap(), text.amount().unwrap());
    }

    #[test]
    fn test_amount_keeps_fraction() {
        assert_eq!(
            PriceInput::Amount(109.95).amount().unwrap(),
            Decimal::new(10995, 2)
        );
    }

    #[test]
    fn test_amount_rejects_negative_and_nan() {
        assert!(PriceInput::Amount(-1.0).amount().is_err());
        assert!(PriceInput::Amount(f64::NAN).amount().is_err());
    }

    #[test]
    fn test_price_input_untagged_serde() {
        let numeric: PriceInput = serde_json::from_str("22.3").unwrap();
        assert_eq!(numeric, PriceInput::Amount(22.3));

        let text: PriceInput = serde_json::from_str("\"₹1,299\"").unwrap();
        assert_eq!(text, PriceInput::Text("₹1,299".to_string()));
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(Decimal::new(2250, 0), CurrencyCode::INR);
        assert_eq!(money.display(), "₹2250.00");

        let money = Money::new(Decimal::new(19995, 3), CurrencyCode::USD);
        assert_eq!(money.to_string(), "$20.00");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("inr".parse::<CurrencyCode>().unwrap(), CurrencyCode::INR);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
