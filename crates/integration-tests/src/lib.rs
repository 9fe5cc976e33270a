//! Integration test harness for Restock.
//!
//! Everything runs in-process: a fake vendor upstream (catalog + notification
//! service) and a real gateway are each served on an ephemeral localhost port,
//! and tests drive the gateway with a plain `reqwest` client.
//!
//! # Layout
//!
//! - [`FakeUpstream`] - configurable stand-in for the vendor service; records
//!   every notify payload it receives so tests can assert what the gateway
//!   forwarded
//! - [`spawn_gateway`] - boots the gateway against an upstream address and a
//!   test-owned data directory
//!
//! Tests live in `tests/`, grouped by API area.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use tokio::net::TcpListener;

use restock_gateway::config::GatewayConfig;
use restock_gateway::routes;
use restock_gateway::state::AppState;

/// One notify request as seen by the fake upstream.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Upstream path that was hit (`/notify` or `/notify/remove`).
    pub path: String,
    /// The JSON body the gateway forwarded.
    pub payload: Value,
}

/// Behavior knobs for the fake vendor upstream.
#[derive(Debug, Clone)]
pub struct UpstreamOptions {
    /// Body served at `/all`.
    pub all: Value,
    /// Body served at `/available`.
    pub available: Value,
    /// Status returned by both notify endpoints.
    pub notify_status: u16,
    /// Body returned by both notify endpoints (empty for success).
    pub notify_body: String,
}

impl Default for UpstreamOptions {
    fn default() -> Self {
        Self {
            all: serde_json::json!({}),
            available: serde_json::json!({}),
            notify_status: 200,
            notify_body: String::new(),
        }
    }
}

#[derive(Clone)]
struct UpstreamState {
    options: Arc<UpstreamOptions>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// A running fake vendor upstream.
pub struct FakeUpstream {
    /// Address the upstream listens on.
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeUpstream {
    /// Spawn the fake upstream with the given behavior.
    pub async fn spawn(options: UpstreamOptions) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = UpstreamState {
            options: Arc::new(options),
            requests: Arc::clone(&requests),
        };

        let app = Router::new()
            .route("/all", get(serve_all))
            .route("/available", get(serve_available))
            .route("/notify", post(record_subscribe))
            .route("/notify/remove", post(record_unsubscribe))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    /// Spawn an upstream that accepts every notify request.
    pub async fn accepting(all: Value, available: Value) -> Self {
        Self::spawn(UpstreamOptions {
            all,
            available,
            ..UpstreamOptions::default()
        })
        .await
    }

    /// Base URL of the upstream.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Every notify request received so far, in arrival order.
    #[must_use]
    pub fn notify_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_all(State(state): State<UpstreamState>) -> Json<Value> {
    Json(state.options.all.clone())
}

async fn serve_available(State(state): State<UpstreamState>) -> Json<Value> {
    Json(state.options.available.clone())
}

async fn record_subscribe(
    State(state): State<UpstreamState>,
    Json(payload): Json<Value>,
) -> Response {
    record(&state, "/notify", payload)
}

async fn record_unsubscribe(
    State(state): State<UpstreamState>,
    Json(payload): Json<Value>,
) -> Response {
    record(&state, "/notify/remove", payload)
}

fn record(state: &UpstreamState, path: &str, payload: Value) -> Response {
    state.requests.lock().unwrap().push(RecordedRequest {
        path: path.to_string(),
        payload,
    });

    let status = StatusCode::from_u16(state.options.notify_status).unwrap();
    (status, state.options.notify_body.clone()).into_response()
}

/// Boot a real gateway wired to `upstream_url`, persisting under `data_dir`.
///
/// Returns the gateway's base URL.
pub async fn spawn_gateway(upstream_url: &str, data_dir: &Path) -> String {
    let config = GatewayConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        catalog_url: upstream_url.trim_end_matches('/').to_string(),
        notify_url: upstream_url.trim_end_matches('/').to_string(),
        data_dir: data_dir.to_path_buf(),
        upstream_timeout: Duration::from_secs(2),
        sentry_dsn: None,
        sentry_environment: None,
    };

    let state = AppState::new(&config).unwrap();
    let app = routes::routes().with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// An upstream base URL that refuses connections (transport failure).
///
/// Binds an ephemeral port to learn a free address, then drops the listener.
pub async fn dead_upstream_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
