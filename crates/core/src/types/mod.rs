//! Core types for Ekocart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod price;
pub mod product;

pub use email::{Email, EmailError};
pub use price::{CurrencyCode, Money, PriceInput, PriceParseError, parse_price};
pub use product::{ProductIdentifier, ProductReference};
