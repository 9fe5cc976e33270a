//! Catalog route handlers.
//!
//! `/all` and `/available` are strict pass-throughs of the two upstream
//! views. `/products` is the merged presentation: one selected view,
//! search-filtered, with each entry carrying its subscription flag.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use restock_core::ProductsData;

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::view::{self, CatalogEntry, CatalogKind};

/// Proxy the upstream "all" catalog view.
#[instrument(skip(state))]
pub async fn all(State(state): State<AppState>) -> Result<Json<ProductsData>> {
    let products = state
        .catalog()
        .fetch_all()
        .await
        .map_err(|source| AppError::CatalogFetch {
            view: CatalogKind::All,
            source,
        })?;
    Ok(Json(products))
}

/// Proxy the upstream "available" catalog view.
#[instrument(skip(state))]
pub async fn available(State(state): State<AppState>) -> Result<Json<ProductsData>> {
    let products = state
        .catalog()
        .fetch_available()
        .await
        .map_err(|source| AppError::CatalogFetch {
            view: CatalogKind::Available,
            source,
        })?;
    Ok(Json(products))
}

/// Query parameters for the merged catalog view.
#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    /// Which catalog to present (default: all).
    #[serde(default)]
    pub view: CatalogKind,
    /// Case-insensitive substring filter on product name (default: none).
    #[serde(default)]
    pub search: String,
}

/// Response body for the merged catalog view.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub view: String,
    /// Entry count before search filtering.
    pub total: usize,
    pub products: Vec<CatalogEntry>,
}

/// Merged catalog view: selected mapping, search filter, subscription flags.
///
/// Both views are fetched concurrently - neither blocks the other - and the
/// available-subset promise is checked while both snapshots are at hand.
#[instrument(skip(state), fields(view = %query.view, search = %query.search))]
pub async fn products(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
) -> Result<Json<ProductsResponse>> {
    let (all, available) = tokio::join!(
        state.catalog().fetch_all(),
        state.catalog().fetch_available(),
    );
    let all = all.map_err(|source| AppError::CatalogFetch {
        view: CatalogKind::All,
        source,
    })?;
    let available = available.map_err(|source| AppError::CatalogFetch {
        view: CatalogKind::Available,
        source,
    })?;

    view::check_available_subset(&all, &available);

    let selected = match query.view {
        CatalogKind::All => &all,
        CatalogKind::Available => &available,
    };

    let store = state.subscriptions().snapshot().await;
    let products = view::entries(selected, &query.search, &store);

    Ok(Json(ProductsResponse {
        view: query.view.to_string(),
        total: selected.len(),
        products,
    }))
}
