//! Upstream notification service client.
//!
//! Forwards subscribe/unsubscribe requests and propagates failures
//! unchanged: a non-success response carries the upstream body verbatim as
//! detail, a request that never completed is a distinct transport error.
//! This client never touches the local subscription store.

use core::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use restock_core::Email;

use crate::config::GatewayConfig;

/// The two remote operations the notification service offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    /// Register an address for a product's back-in-stock email.
    Subscribe,
    /// Withdraw a previous registration.
    Unsubscribe,
}

impl NotifyAction {
    /// Upstream endpoint path for this action.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Subscribe => "notify",
            Self::Unsubscribe => "notify/remove",
        }
    }
}

impl fmt::Display for NotifyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
        })
    }
}

/// Errors that can occur when calling the notification service.
///
/// The two kinds are deliberately distinct: [`NotifyError::Rejected`] means
/// the upstream made a decision (and its body is shown to the user),
/// [`NotifyError::Transport`] means no decision was received at all.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request did not complete (connect failure, timeout).
    #[error("notification request did not complete: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream responded with a non-success status.
    #[error("notification service rejected the request ({status}): {body}")]
    Rejected {
        /// Upstream HTTP status code.
        status: u16,
        /// Upstream response body, verbatim.
        body: String,
    },
}

/// Request body for both notify endpoints.
#[derive(Debug, Serialize)]
struct NotifyRequest<'a> {
    email: &'a str,
    product: &'a str,
}

/// Client for the upstream notification service.
#[derive(Debug, Clone)]
pub struct NotifierClient {
    client: reqwest::Client,
    base_url: String,
}

impl NotifierClient {
    /// Create a new notifier client with the configured request timeout.
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
            base_url: config.notify_url.clone(),
        })
    }

    /// Ask the upstream to email `email` when `product` is back in stock.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] on transport failure or upstream rejection.
    pub async fn subscribe(&self, email: &Email, product: &str) -> Result<(), NotifyError> {
        self.send(NotifyAction::Subscribe, email, product).await
    }

    /// Withdraw a subscription from the upstream service.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] on transport failure or upstream rejection.
    pub async fn unsubscribe(&self, email: &Email, product: &str) -> Result<(), NotifyError> {
        self.send(NotifyAction::Unsubscribe, email, product).await
    }

    #[instrument(skip(self, email), fields(action = %action, product))]
    async fn send(
        &self,
        action: NotifyAction,
        email: &Email,
        product: &str,
    ) -> Result<(), NotifyError> {
        let url = format!("{}/{}", self.base_url, action.path());

        let response = self
            .client
            .post(&url)
            .json(&NotifyRequest {
                email: email.as_str(),
                product,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(status = status.as_u16(), "notification request accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
