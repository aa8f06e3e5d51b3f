//! Checkout: form validation, order summary and the order stub.
//!
//! There is no payment integration. Submitting a valid form produces an
//! order reference and leaves the cart as it is.

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use ekocart_core::cart::{
    Cart, CheckoutTotals, LineItemKey, PriceParseWarning, line_total, subtotal, unit_price,
};
use ekocart_core::{CurrencyCode, Email, Money};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 ()\-]{5,18}[0-9]$").expect("Invalid regex"));

static POSTAL_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,8}[A-Za-z0-9]$").expect("Invalid regex"));

/// Countries the store ships to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    USA,
    CA,
    IND,
    GER,
    FRA,
    AUS,
    ENG,
    JP,
    BRA,
    CN,
}

impl Country {
    pub const ALL: [Self; 10] = [
        Self::USA,
        Self::CA,
        Self::IND,
        Self::GER,
        Self::FRA,
        Self::AUS,
        Self::ENG,
        Self::JP,
        Self::BRA,
        Self::CN,
    ];

    /// Form value.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USA => "USA",
            Self::CA => "CA",
            Self::IND => "IND",
            Self::GER => "GER",
            Self::FRA => "FRA",
            Self::AUS => "AUS",
            Self::ENG => "ENG",
            Self::JP => "JP",
            Self::BRA => "BRA",
            Self::CN => "CN",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::USA => "United States",
            Self::CA => "Canada",
            Self::IND => "India",
            Self::GER => "Germany",
            Self::FRA => "France",
            Self::AUS => "Australia",
            Self::ENG => "England",
            Self::JP => "Japan",
            Self::BRA => "Brazil",
            Self::CN => "China",
        }
    }
}

impl FromStr for Country {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == s.trim())
            .ok_or(())
    }
}

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Direct Bank Transfer")]
    DirectBankTransfer,
    #[serde(rename = "Check Payment")]
    CheckPayment,
    #[serde(rename = "Paypal Account")]
    PaypalAccount,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::DirectBankTransfer, Self::CheckPayment, Self::PaypalAccount];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DirectBankTransfer => "Direct Bank Transfer",
            Self::CheckPayment => "Check Payment",
            Self::PaypalAccount => "Paypal Account",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.label() == s.trim())
            .ok_or(())
    }
}

/// Checkout form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckoutForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub country: String,
    pub address: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub coupon_code: Option<String>,
    pub payment_method: String,
    pub accept_terms: bool,
}

/// One problem with one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A checkout form that passed validation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedCheckout {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub company: Option<String>,
    pub country: Country,
    pub address: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    /// Check every field, reporting all problems at once.
    ///
    /// # Errors
    ///
    /// Returns the list of [`FieldError`]s when any field is invalid.
    pub fn validate(&self) -> Result<ValidatedCheckout, Vec<FieldError>> {
        let mut errors = Vec::new();

        for (field, value) in [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError::new(field, "This field is required"));
            }
        }

        let email = Email::parse(&self.email)
            .map_err(|e| errors.push(FieldError::new("email", e.to_string())))
            .ok();

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.push(FieldError::new("phone", "This field is required"));
        } else if !PHONE_RE.is_match(phone) {
            errors.push(FieldError::new("phone", "Enter a valid phone number"));
        }

        let zip = self.zip.trim();
        if zip.is_empty() {
            errors.push(FieldError::new("zip", "This field is required"));
        } else if !POSTAL_CODE_RE.is_match(zip) {
            errors.push(FieldError::new("zip", "Enter a valid postcode / ZIP"));
        }

        let country = self
            .country
            .parse::<Country>()
            .map_err(|()| errors.push(FieldError::new("country", "Select a country")))
            .ok();

        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(|()| errors.push(FieldError::new("paymentMethod", "Select a payment method")))
            .ok();

        if !self.accept_terms {
            errors.push(FieldError::new(
                "acceptTerms",
                "You must accept the terms and conditions",
            ));
        }

        match (email, country, payment_method) {
            (Some(email), Some(country), Some(payment_method)) if errors.is_empty() => {
                Ok(ValidatedCheckout {
                    first_name: self.first_name.trim().to_string(),
                    last_name: self.last_name.trim().to_string(),
                    email,
                    phone: phone.to_string(),
                    company: optional(self.company.as_deref()),
                    country,
                    address: self.address.trim().to_string(),
                    address_line2: optional(self.address_line2.as_deref()),
                    city: self.city.trim().to_string(),
                    state: self.state.trim().to_string(),
                    zip: zip.to_string(),
                    payment_method,
                })
            }
            _ => Err(errors),
        }
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// One row of the order summary.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub key: LineItemKey,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Option<Money>,
    pub line_total: Money,
}

/// What the checkout page shows next to the form.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub lines: Vec<OrderLine>,
    pub item_count: u64,
    pub totals: CheckoutTotals,
    pub subtotal_display: String,
    pub shipping_display: String,
    pub total_display: String,
    pub warnings: Vec<PriceParseWarning>,
}

impl OrderSummary {
    #[must_use]
    pub fn from_cart(cart: &Cart, shipping: Decimal, currency: CurrencyCode) -> Self {
        let lines = cart
            .items()
            .iter()
            .map(|item| {
                let unit = unit_price(item).ok();
                let total = line_total(item);
                OrderLine {
                    key: item.key.clone(),
                    name: item.product.display_name().unwrap_or_default().to_string(),
                    quantity: item.quantity.get(),
                    unit_price: unit.map(|u| Money::new(u, currency)),
                    line_total: Money::new(total, currency),
                }
            })
            .collect();

        let subtotal = subtotal(cart);
        let totals = CheckoutTotals::with_flat_shipping(subtotal.amount, shipping);

        Self {
            lines,
            item_count: cart.item_count(),
            subtotal_display: Money::new(totals.subtotal, currency).display(),
            shipping_display: Money::new(totals.shipping, currency).display(),
            total_display: Money::new(totals.total, currency).display(),
            totals,
            warnings: subtotal.warnings,
        }
    }
}

/// Result of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct OrderConfirmation {
    pub reference: Uuid,
    pub placed_at: DateTime<Utc>,
    pub total: Money,
    pub item_count: u64,
    pub payment_method: PaymentMethod,
}

/// Errors raised when submitting a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more fields are invalid.
    #[error("checkout form has {} invalid field(s)", .0.len())]
    Invalid(Vec<FieldError>),

    /// There is nothing to order.
    #[error("cart is empty")]
    EmptyCart,
}

/// Validate the form and place the order.
///
/// # Errors
///
/// Returns [`CheckoutError::Invalid`] with every field problem, or
/// [`CheckoutError::EmptyCart`] when the cart has no lines.
pub fn submit(
    form: &CheckoutForm,
    cart: &Cart,
    shipping: Decimal,
    currency: CurrencyCode,
) -> Result<OrderConfirmation, CheckoutError> {
    let checkout = form.validate().map_err(CheckoutError::Invalid)?;

    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let summary = OrderSummary::from_cart(cart, shipping, currency);
    let confirmation = OrderConfirmation {
        reference: Uuid::new_v4(),
        placed_at: Utc::now(),
        total: Money::new(summary.totals.total, currency),
        item_count: summary.item_count,
        payment_method: checkout.payment_method,
    };

    info!(
        reference = %confirmation.reference,
        total = %confirmation.total,
        items = confirmation.item_count,
        country = checkout.country.code(),
        payment_method = checkout.payment_method.label(),
        "Order placed"
    );

    Ok(confirmation)
}

/// Outcome of a coupon request.
#[derive(Debug, Clone, Serialize)]
pub struct CouponOutcome {
    pub code: String,
    pub applied: bool,
    pub message: &'static str,
}

/// Record a coupon request. No discounts exist yet, so nothing is applied.
#[must_use]
pub fn apply_coupon(code: &str) -> CouponOutcome {
    let code = code.trim().to_string();
    info!(coupon = %code, "Coupon requested");

    CouponOutcome {
        code,
        applied: false,
        message: "Coupon codes are not available yet",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ekocart_core::ProductReference;
    use ekocart_core::cart::{CartStore, MemoryStorage};

    use super::*;

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            email: "asha@example.in".to_string(),
            phone: "+91 98765 43210".to_string(),
            company: Some("  ".to_string()),
            country: "IND".to_string(),
            address: "12 MG Road".to_string(),
            address_line2: None,
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            zip: "560001".to_string(),
            coupon_code: None,
            payment_method: "Paypal Account".to_string(),
            accept_terms: true,
        }
    }

    fn cart() -> Cart {
        let mut store = CartStore::restore(MemoryStorage::default());
        store
            .add_or_increment(ProductReference::named("A").with_price("₹1,000"))
            .unwrap();
        store
            .add_or_increment(ProductReference::named("A").with_price("₹1,000"))
            .unwrap();
        store
            .add_or_increment(ProductReference::named("B").with_price("₹250"))
            .unwrap();
        store.cart().clone()
    }

    fn fields(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn test_valid_form() {
        let checkout = valid_form().validate().unwrap();
        assert_eq!(checkout.country, Country::IND);
        assert_eq!(checkout.payment_method, PaymentMethod::PaypalAccount);
        assert_eq!(checkout.company, None);
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = CheckoutForm::default().validate().unwrap_err();
        assert_eq!(
            fields(&errors),
            [
                "firstName",
                "lastName",
                "address",
                "city",
                "state",
                "email",
                "phone",
                "zip",
                "country",
                "paymentMethod",
                "acceptTerms",
            ]
        );
    }

    #[test]
    fn test_format_checks() {
        let form = CheckoutForm {
            email: "asha@localhost".to_string(),
            phone: "call me".to_string(),
            zip: "!!".to_string(),
            country: "NZ".to_string(),
            payment_method: "Cash".to_string(),
            ..valid_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(
            fields(&errors),
            ["email", "phone", "zip", "country", "paymentMethod"]
        );
    }

    #[test]
    fn test_terms_must_be_accepted() {
        let form = CheckoutForm {
            accept_terms: false,
            ..valid_form()
        };
        assert_eq!(fields(&form.validate().unwrap_err()), ["acceptTerms"]);
    }

    #[test]
    fn test_form_field_names() {
        let form: CheckoutForm = serde_json::from_str(
            r#"{"firstName": "A", "paymentMethod": "Check Payment", "acceptTerms": true}"#,
        )
        .unwrap();
        assert_eq!(form.first_name, "A");
        assert!(form.accept_terms);
    }

    #[test]
    fn test_order_summary() {
        let summary = OrderSummary::from_cart(&cart(), Decimal::new(50, 0), CurrencyCode::INR);
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.totals.subtotal, Decimal::new(2250, 0));
        assert_eq!(summary.total_display, "₹2300.00");
        assert_eq!(summary.lines[0].line_total.amount, Decimal::new(2000, 0));
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_order_summary_survives_oversized_price() {
        let mut store = CartStore::restore(MemoryStorage::default());
        let big = ProductReference::named("Big").with_price("79228162514264337593543950335");
        store.add_or_increment(big.clone()).unwrap();
        store.add_or_increment(big).unwrap();
        store
            .add_or_increment(ProductReference::named("B").with_price("₹250"))
            .unwrap();

        let summary = OrderSummary::from_cart(store.cart(), Decimal::new(50, 0), CurrencyCode::INR);
        assert_eq!(summary.lines[0].line_total.amount, Decimal::ZERO);
        assert_eq!(summary.total_display, "₹300.00");
        assert_eq!(summary.warnings.len(), 1);
    }

    #[test]
    fn test_submit_leaves_cart_untouched() {
        let cart = cart();
        let before = cart.clone();
        let confirmation = submit(&valid_form(), &cart, Decimal::ZERO, CurrencyCode::INR).unwrap();

        assert_eq!(confirmation.total.amount, Decimal::new(2250, 0));
        assert_eq!(confirmation.item_count, 3);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_submit_rejects_invalid_then_empty() {
        assert!(matches!(
            submit(&CheckoutForm::default(), &cart(), Decimal::ZERO, CurrencyCode::USD),
            Err(CheckoutError::Invalid(_))
        ));
        assert!(matches!(
            submit(&valid_form(), &Cart::new(), Decimal::ZERO, CurrencyCode::USD),
            Err(CheckoutError::EmptyCart)
        ));
    }

    #[test]
    fn test_coupon_is_not_applied() {
        let outcome = apply_coupon(" SAVE10 ");
        assert_eq!(outcome.code, "SAVE10");
        assert!(!outcome.applied);
    }
}
