//! End-to-end subscribe/unsubscribe flows through the gateway.
//!
//! The defining invariant under test: the local subscription store changes
//! only after the upstream notification service confirmed the operation.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};
use tempfile::TempDir;

use restock_integration_tests::{
    FakeUpstream, UpstreamOptions, dead_upstream_url, spawn_gateway,
};

async fn subscriptions(client: &reqwest::Client, gateway: &str) -> Value {
    client
        .get(format!("{gateway}/subscriptions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn subscribe_success_persists_one_record() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{gateway}/notify"))
        .json(&json!({"email": "a@x.com", "product": "High Protein Milk"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "");

    let body = subscriptions(&client, &gateway).await;
    let records = body["subscriptions"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["productName"], "High Protein Milk");
    assert_eq!(records[0]["email"], "a@x.com");
    assert_eq!(body["lastEmail"], "a@x.com");

    // The record also landed in the durable layout.
    assert!(data_dir.path().join("productSubscriptions").exists());
}

#[tokio::test]
async fn upstream_rejection_leaves_store_empty_and_relays_body() {
    let upstream = FakeUpstream::spawn(UpstreamOptions {
        notify_status: 400,
        notify_body: "already subscribed".to_string(),
        ..UpstreamOptions::default()
    })
    .await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{gateway}/notify"))
        .json(&json!({"email": "a@x.com", "product": "High Protein Milk"}))
        .send()
        .await
        .unwrap();

    // Upstream status and body pass through verbatim.
    assert_eq!(resp.status(), 400);
    assert_eq!(resp.text().await.unwrap(), "already subscribed");

    let body = subscriptions(&client, &gateway).await;
    assert!(body["subscriptions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn transport_failure_returns_fixed_message_and_no_mutation() {
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&dead_upstream_url().await, data_dir.path()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{gateway}/notify"))
        .json(&json!({"email": "a@x.com", "product": "Ghee"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(
        resp.text().await.unwrap(),
        "Failed to subscribe to notifications"
    );

    let resp = client
        .post(format!("{gateway}/notify/remove"))
        .json(&json!({"email": "a@x.com", "product": "Ghee"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(
        resp.text().await.unwrap(),
        "Failed to unsubscribe from notifications"
    );

    let body = subscriptions(&client, &gateway).await;
    assert!(body["subscriptions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_email_fails_fast_without_upstream_call() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{gateway}/notify"))
        .json(&json!({"email": "", "product": "Ghee"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Validation rejected the request before any network call.
    assert!(upstream.notify_requests().is_empty());
}

#[tokio::test]
async fn unsubscribe_is_bound_to_the_recorded_email() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{gateway}/notify"))
        .json(&json!({"email": "a@x.com", "product": "Milk"}))
        .send()
        .await
        .unwrap();

    // The caller submits a different address; the gateway must still
    // unsubscribe the one that was actually registered.
    let resp = client
        .post(format!("{gateway}/notify/remove"))
        .json(&json!({"email": "b@y.com", "product": "Milk"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let seen = upstream.notify_requests();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[1].path, "/notify/remove");
    assert_eq!(seen[1].payload["email"], "a@x.com");

    let body = subscriptions(&client, &gateway).await;
    assert!(body["subscriptions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn resubscribe_overwrites_instead_of_duplicating() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    for email in ["a@x.com", "b@y.com"] {
        let resp = client
            .post(format!("{gateway}/notify"))
            .json(&json!({"email": email, "product": "Milk"}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let body = subscriptions(&client, &gateway).await;
    let records = body["subscriptions"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["email"], "b@y.com");
}

#[tokio::test]
async fn store_survives_gateway_restart() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();

    let first = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();
    client
        .post(format!("{first}/notify"))
        .json(&json!({"email": "a@x.com", "product": "Paneer"}))
        .send()
        .await
        .unwrap();

    // A second gateway over the same data directory sees the same store.
    let second = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let body = subscriptions(&client, &second).await;
    let records = body["subscriptions"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["productName"], "Paneer");
}

#[tokio::test]
async fn corrupt_store_recovers_as_empty() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    std::fs::write(data_dir.path().join("productSubscriptions"), "{broken").unwrap();

    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    let body = subscriptions(&client, &gateway).await;
    assert!(body["subscriptions"].as_array().unwrap().is_empty());
}
