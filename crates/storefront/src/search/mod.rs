//! Marketplace search backend client.
//!
//! The backend scrapes several marketplaces per query and groups the
//! listings of one product together. Calls are slow, so nothing here is
//! cached and the client carries its own timeout.

pub mod types;

pub use types::{LooseNumber, MarketplaceProduct, MarketplaceVariant, VariantDetail};

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::SearchConfig;

use types::{
    RecommendationRequest, SearchRequest, SearchResponse, VariantDetailsRequest,
    VariantDetailsResponse,
};

/// Number of recommendations asked for when the caller does not say.
pub const DEFAULT_RECOMMENDATIONS: usize = 5;

/// Errors that can occur when talking to the search backend.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was blank; no request was made.
    #[error("Please enter a search term")]
    EmptyQuery,

    /// No links were given for a details lookup.
    #[error("No links provided")]
    NoLinks,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend reported an error.
    #[error("Search backend error: {status} - {message}")]
    Backend { status: u16, message: String },
}

/// Client for the marketplace search backend.
#[derive(Clone)]
pub struct SearchClient {
    inner: Arc<SearchClientInner>,
}

struct SearchClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    /// Create a new search client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(SearchClientInner {
                client,
                base_url: config.api_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// POST a JSON body and decode the JSON answer, whatever the status.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<(u16, T), SearchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        match serde_json::from_str(&text) {
            Ok(decoded) => Ok((status.as_u16(), decoded)),
            Err(_) if !status.is_success() => Err(SearchError::Backend {
                status: status.as_u16(),
                message: text.chars().take(200).collect(),
            }),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %text.chars().take(500).collect::<String>(),
                    "Failed to parse search backend response"
                );
                Err(SearchError::Parse(e))
            }
        }
    }

    /// Search all marketplaces for a query.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::EmptyQuery` for a blank query without calling
    /// the backend, or an error if the backend fails.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<MarketplaceProduct>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let (status, response): (u16, SearchResponse) = self
            .post_json("/api/search", &SearchRequest { query })
            .await?;

        match (response.products, response.error) {
            (Some(products), _) => {
                debug!(count = products.len(), "Marketplace search complete");
                Ok(products)
            }
            (None, Some(message)) => Err(SearchError::Backend { status, message }),
            (None, None) => Ok(Vec::new()),
        }
    }

    /// Fetch ratings for a set of variant links.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::NoLinks` for an empty list, or an error if the
    /// backend fails.
    #[instrument(skip(self, links), fields(links = links.len()))]
    pub async fn variant_details(&self, links: &[String]) -> Result<Vec<VariantDetail>, SearchError> {
        if links.is_empty() {
            return Err(SearchError::NoLinks);
        }

        let (status, response): (u16, VariantDetailsResponse) = self
            .post_json("/api/product_details", &VariantDetailsRequest { links })
            .await?;

        if response.status.as_deref() == Some("success") {
            return Ok(response.results);
        }

        Err(SearchError::Backend {
            status,
            message: response
                .message
                .or(response.error)
                .unwrap_or_else(|| "details lookup failed".to_string()),
        })
    }

    /// Products similar to one of the current search results.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    #[instrument(skip(self, results), fields(results = results.len()))]
    pub async fn content_recommendations(
        &self,
        product_id: &str,
        top_n: usize,
        results: &[MarketplaceProduct],
    ) -> Result<Vec<MarketplaceProduct>, SearchError> {
        let request = RecommendationRequest {
            product_id,
            top_n,
            search_results: results,
        };

        let (status, recommendations): (u16, Vec<MarketplaceProduct>) = self
            .post_json("/api/recommendations/content", &request)
            .await?;

        debug!(status, count = recommendations.len(), "Recommendations fetched");
        Ok(recommendations)
    }
}
