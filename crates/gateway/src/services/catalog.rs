//! Upstream catalog client.
//!
//! Fetches the two catalog views the vendor publishes: the full product list
//! and the currently-available subset. Each call is a fresh fetch - no
//! retries, no caching - and the parsed mapping is returned verbatim in
//! upstream order.

use thiserror::Error;
use tracing::instrument;

use restock_core::ProductsData;

use crate::config::GatewayConfig;

/// Errors that can occur when fetching a catalog view.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete (connect failure, timeout).
    #[error("catalog request did not complete: {0}")]
    Transport(#[source] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("catalog returned HTTP {0}")]
    Status(u16),

    /// The response body was not a parseable product mapping.
    #[error("catalog response was not a product mapping: {0}")]
    Parse(#[source] reqwest::Error),
}

/// Client for the upstream catalog service.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a new catalog client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.catalog_url.clone(),
        })
    }

    /// Fetch the full catalog ("all" view).
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the call fails or the body is unparseable.
    pub async fn fetch_all(&self) -> Result<ProductsData, FetchError> {
        self.fetch("all").await
    }

    /// Fetch the currently-available catalog ("available" view).
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the call fails or the body is unparseable.
    pub async fn fetch_available(&self) -> Result<ProductsData, FetchError> {
        self.fetch("available").await
    }

    #[instrument(skip(self))]
    async fn fetch(&self, view: &str) -> Result<ProductsData, FetchError> {
        let url = format!("{}/{view}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let products = response
            .json::<ProductsData>()
            .await
            .map_err(FetchError::Parse)?;

        tracing::debug!(view, count = products.len(), "fetched catalog view");
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::Status(503);
        assert_eq!(err.to_string(), "catalog returned HTTP 503");
    }
}
