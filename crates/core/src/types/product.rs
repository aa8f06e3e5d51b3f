//! Product references as received from the catalog and search backends.
//!
//! The two sources use different field names for the same concepts (`title`
//! vs `name`, `image` vs `thumbnail`), so the serde aliases below accept both.
//! Serialization always uses the canonical names.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::price::PriceInput;

/// A product identifier as sent by a catalog source.
///
/// Sources send either integers (`1`) or strings (`"sku-42"`). Both render
/// through [`fmt::Display`] the same way, so `1` and `"1"` are one identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductIdentifier {
    Number(i64),
    Text(String),
}

impl ProductIdentifier {
    /// Returns true when the identifier carries no usable value.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

impl fmt::Display for ProductIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text.trim()),
        }
    }
}

impl From<i64> for ProductIdentifier {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for ProductIdentifier {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

/// An immutable product record from a catalog or search collaborator.
///
/// Every field is optional on the wire; identity resolution decides whether a
/// reference is usable as a cart line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductReference {
    /// Stable identifier, when the source has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductIdentifier>,
    /// Display name.
    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Image URL.
    #[serde(default, alias = "thumbnail", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price, numeric or currency-formatted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceInput>,
    /// Brand name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Marketplace the listing came from.
    #[serde(default, alias = "source_site", skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Long description, carried through for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Catalog category, carried through for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ProductReference {
    /// Start a reference with just a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<ProductIdentifier>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the price.
    #[must_use]
    pub fn with_price(mut self, price: impl Into<PriceInput>) -> Self {
        self.price = Some(price.into());
        self
    }

    /// Set the source marketplace.
    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Set the brand.
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Set the image URL.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Display name, if present and not blank.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
