//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::reconciler::SubscriptionService;
use crate::services::catalog::CatalogClient;
use crate::services::notifier::NotifierClient;
use crate::storage::SubscriptionStorage;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the catalog client and the
/// subscription service (which owns the notifier client); the service is the
/// single source of truth for subscription state - handlers never keep their
/// own copies.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: CatalogClient,
    subscriptions: SubscriptionService,
}

impl AppState {
    /// Create a new application state: build the upstream clients and load
    /// the persisted subscription store.
    ///
    /// A corrupt store is recovered as empty and logged as a warning, never
    /// an error - startup proceeds.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let catalog = CatalogClient::new(config)?;
        let notifier = NotifierClient::new(config)?;
        let storage = SubscriptionStorage::new(&config.data_dir);

        let (subscriptions, warning) = SubscriptionService::load(notifier, storage);
        if let Some(warning) = warning {
            tracing::warn!(error = %warning, "recovered subscription store as empty");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                catalog,
                subscriptions,
            }),
        })
    }

    /// Get a reference to the upstream catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the subscription service.
    #[must_use]
    pub fn subscriptions(&self) -> &SubscriptionService {
        &self.inner.subscriptions
    }
}
