//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::search::{SearchClient, SearchError};
use crate::services::auth::{AuthClient, AuthError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog client: {0}")]
    Catalog(#[from] CatalogError),
    #[error("search client: {0}")]
    Search(#[from] SearchError),
    #[error("auth client: {0}")]
    Auth(#[from] AuthError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration and the clients for
/// the catalog, the marketplace search backend and the identity provider.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    search: SearchClient,
    auth: Option<AuthClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the HTTP clients cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        let search = SearchClient::new(&config.search)?;
        let auth = config.firebase.as_ref().map(AuthClient::new).transpose()?;

        if auth.is_none() {
            tracing::warn!("FIREBASE_API_KEY not set, sign-in and sign-up are disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                search,
                auth,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the marketplace search client.
    #[must_use]
    pub fn search(&self) -> &SearchClient {
        &self.inner.search
    }

    /// The identity provider client, when sign-in is configured.
    #[must_use]
    pub fn auth(&self) -> Option<&AuthClient> {
        self.inner.auth.as_ref()
    }
}
