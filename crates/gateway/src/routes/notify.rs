//! Notification route handlers.
//!
//! Both endpoints keep the upstream wire contract: success is a 200 with an
//! empty body, an upstream rejection is relayed verbatim with the upstream
//! status, and a transport failure is a fixed plain-text 500. The local
//! store is mutated only on confirmed upstream success, inside the
//! reconciler.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::reconciler::SubscriptionError;
use crate::services::notifier::{NotifyAction, NotifyError};
use crate::state::AppState;

/// Request body for both notify endpoints.
#[derive(Debug, Deserialize)]
pub struct NotifyPayload {
    pub email: String,
    pub product: String,
}

/// Subscribe to back-in-stock notifications for a product.
#[instrument(skip(state, payload), fields(product = %payload.product))]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<NotifyPayload>,
) -> Result<StatusCode> {
    state
        .subscriptions()
        .subscribe_to(&payload.product, &payload.email)
        .await
        .map_err(|err| into_app_error(NotifyAction::Subscribe, err))?;

    Ok(StatusCode::OK)
}

/// Unsubscribe from back-in-stock notifications for a product.
#[instrument(skip(state, payload), fields(product = %payload.product))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<NotifyPayload>,
) -> Result<StatusCode> {
    state
        .subscriptions()
        .unsubscribe_from(&payload.product, &payload.email)
        .await
        .map_err(|err| into_app_error(NotifyAction::Unsubscribe, err))?;

    Ok(StatusCode::OK)
}

/// Map reconciler failures onto the endpoint's response contract.
fn into_app_error(action: NotifyAction, err: SubscriptionError) -> AppError {
    match err {
        SubscriptionError::InvalidEmail(e) => AppError::Validation(e.to_string()),
        SubscriptionError::Notify(NotifyError::Rejected { status, body }) => {
            AppError::UpstreamRejected { status, body }
        }
        SubscriptionError::Notify(NotifyError::Transport(e)) => {
            tracing::warn!(error = %e, action = %action, "notification upstream unreachable");
            AppError::NotifyTransport { action }
        }
        SubscriptionError::Storage(e) => AppError::Storage(e),
    }
}
