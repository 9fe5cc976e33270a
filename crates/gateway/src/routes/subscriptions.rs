//! Subscription route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use restock_core::{SubscriptionRecord, SubscriptionStats};

use crate::error::Result;
use crate::state::AppState;

/// Response body for the subscription listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionsResponse {
    /// Active records, newest first.
    pub subscriptions: Vec<SubscriptionRecord>,
    /// Cached last-used email for pre-filling the subscribe form.
    pub last_email: Option<String>,
}

/// List active subscriptions, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<SubscriptionsResponse> {
    let store = state.subscriptions().snapshot().await;

    let mut subscriptions: Vec<SubscriptionRecord> = store.records().cloned().collect();
    subscriptions.sort_by(|a, b| b.subscribed_at.cmp(&a.subscribed_at));

    Json(SubscriptionsResponse {
        subscriptions,
        last_email: state.subscriptions().last_email(),
    })
}

/// Aggregate subscription statistics.
#[instrument(skip(state))]
pub async fn stats(State(state): State<AppState>) -> Json<SubscriptionStats> {
    Json(state.subscriptions().stats().await)
}

/// Clear every local subscription (the upstream service is not informed).
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<StatusCode> {
    state.subscriptions().clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
