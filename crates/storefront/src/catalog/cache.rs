//! Cache types for catalog responses.

use std::sync::Arc;

use super::types::CatalogProduct;

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(i64),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<CatalogProduct>>),
    Product(Box<CatalogProduct>),
    Categories(Arc<Vec<String>>),
}
