//! Subscription listing, statistics, and clear-all behavior.

#![allow(clippy::unwrap_used)]

use serde_json::{Value, json};
use tempfile::TempDir;

use restock_integration_tests::{FakeUpstream, spawn_gateway};

async fn subscribe(client: &reqwest::Client, gateway: &str, email: &str, product: &str) {
    let resp = client
        .post(format!("{gateway}/notify"))
        .json(&json!({"email": email, "product": product}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn listing_is_newest_first_with_cached_email() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    subscribe(&client, &gateway, "a@x.com", "First").await;
    subscribe(&client, &gateway, "b@y.com", "Second").await;

    let body: Value = client
        .get(format!("{gateway}/subscriptions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let records = body["subscriptions"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["productName"], "Second");
    assert_eq!(records[1]["productName"], "First");
    assert_eq!(body["lastEmail"], "b@y.com");
}

#[tokio::test]
async fn stats_reflect_the_store() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    subscribe(&client, &gateway, "a@x.com", "Milk").await;
    subscribe(&client, &gateway, "a@x.com", "Ghee").await;
    subscribe(&client, &gateway, "b@y.com", "Paneer").await;

    let stats: Value = client
        .get(format!("{gateway}/subscriptions/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["totalSubscriptions"], 3);
    assert_eq!(stats["uniqueEmails"], 2);
    assert_eq!(stats["emailBreakdown"]["a@x.com"], 2);
    assert_eq!(stats["emailBreakdown"]["b@y.com"], 1);
    assert_eq!(stats["oldestSubscription"]["productName"], "Milk");
}

#[tokio::test]
async fn stats_on_empty_store() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;

    let stats: Value = reqwest::get(format!("{gateway}/subscriptions/stats"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["totalSubscriptions"], 0);
    assert_eq!(stats["uniqueEmails"], 0);
    assert!(stats["oldestSubscription"].is_null());
}

#[tokio::test]
async fn clear_empties_store_and_cached_email() {
    let upstream = FakeUpstream::accepting(json!({}), json!({})).await;
    let data_dir = TempDir::new().unwrap();
    let gateway = spawn_gateway(&upstream.base_url(), data_dir.path()).await;
    let client = reqwest::Client::new();

    subscribe(&client, &gateway, "a@x.com", "A").await;
    subscribe(&client, &gateway, "a@x.com", "B").await;

    let resp = client
        .delete(format!("{gateway}/subscriptions"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let body: Value = client
        .get(format!("{gateway}/subscriptions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["subscriptions"].as_array().unwrap().is_empty());
    assert!(body["lastEmail"].is_null());

    // The cached email key is gone from the durable layout too.
    assert!(!data_dir.path().join("userEmail").exists());

    // Clearing is local only: the upstream saw the two subscribes and
    // nothing else.
    assert_eq!(upstream.notify_requests().len(), 2);
}
