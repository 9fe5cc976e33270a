//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. Route handlers return
//! `Result<T, AppError>`; every failure becomes a user-visible response and
//! none are fatal to the process.
//!
//! The response shapes for the proxy endpoints are part of the public
//! contract and match what the upstream-facing routes always returned:
//! catalog failures are a small JSON object, notify transport failures are a
//! fixed plain-text message, and upstream rejections pass the upstream body
//! and status through verbatim.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::catalog::FetchError;
use crate::services::notifier::NotifyAction;
use crate::storage::StorageError;
use crate::view::CatalogKind;

/// Application-level error type for the gateway.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad user input; rejected before any upstream call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A catalog view could not be fetched.
    #[error("failed to fetch {view} catalog: {source}")]
    CatalogFetch {
        view: CatalogKind,
        #[source]
        source: FetchError,
    },

    /// The notification service could not be reached at all.
    #[error("notification service unreachable during {action}")]
    NotifyTransport { action: NotifyAction },

    /// The notification service rejected the request; its body is relayed.
    #[error("notification service rejected the request ({status})")]
    UpstreamRejected { status: u16, body: String },

    /// Durable subscription storage failed.
    #[error("subscription storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side failures to Sentry
        if matches!(
            self,
            Self::CatalogFetch { .. } | Self::NotifyTransport { .. } | Self::Storage(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message).into_response(),

            Self::CatalogFetch { view, .. } => {
                let message = match view {
                    CatalogKind::All => "Failed to fetch products",
                    CatalogKind::Available => "Failed to fetch available products",
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message })),
                )
                    .into_response()
            }

            Self::NotifyTransport { action } => {
                let message = match action {
                    NotifyAction::Subscribe => "Failed to subscribe to notifications",
                    NotifyAction::Unsubscribe => "Failed to unsubscribe from notifications",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }

            Self::UpstreamRejected { status, body } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, body).into_response()
            }

            Self::Storage(_) => {
                // Don't expose storage paths or I/O details to clients
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
