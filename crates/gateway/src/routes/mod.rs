//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health               - Liveness check
//!
//! # Catalog proxy (upstream pass-through)
//! GET    /all                  - Full catalog, verbatim
//! GET    /available            - Currently-available catalog, verbatim
//!
//! # Merged catalog view
//! GET    /products             - Selected view + search filter + subscribed flags
//!
//! # Notification proxy (reconciled)
//! POST   /notify               - Subscribe; persists locally on upstream success
//! POST   /notify/remove        - Unsubscribe; removes locally on upstream success
//!
//! # Subscriptions
//! GET    /subscriptions        - Active records (newest first) + cached email
//! GET    /subscriptions/stats  - Aggregate statistics
//! DELETE /subscriptions        - Clear all (local only)
//! ```

pub mod catalog;
pub mod notify;
pub mod subscriptions;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/all", get(catalog::all))
        .route("/available", get(catalog::available))
        .route("/products", get(catalog::products))
}

/// Create the notification routes router.
pub fn notify_routes() -> Router<AppState> {
    Router::new()
        .route("/notify", post(notify::subscribe))
        .route("/notify/remove", post(notify::unsubscribe))
}

/// Create the subscription routes router.
pub fn subscription_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            get(subscriptions::index).delete(subscriptions::clear),
        )
        .route("/subscriptions/stats", get(subscriptions::stats))
}

/// Create all routes for the gateway.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(notify_routes())
        .merge(subscription_routes())
}
