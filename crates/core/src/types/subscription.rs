//! Subscription records, the subscription store, and derived statistics.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::Email;

/// One standing request to be emailed when a product comes back in stock.
///
/// Serialized field names match the persisted storage layout (`email`,
/// `subscribedAt`, `productName`), so records written by earlier versions of
/// the service load without migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    /// Address the upstream notification service will mail.
    pub email: Email,
    /// When the subscription was confirmed by the upstream service.
    pub subscribed_at: DateTime<Utc>,
    /// Name of the product the subscription watches.
    pub product_name: String,
}

/// The set of active subscriptions, keyed by product name.
///
/// Invariant: a product name appears here if and only if the user holds an
/// active subscription for it - records are inserted only after the upstream
/// service confirmed a subscribe, and removed only after a confirmed
/// unsubscribe (or an explicit local clear). At most one record exists per
/// product; re-subscribing with a different address overwrites in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionStore {
    records: IndexMap<String, SubscriptionRecord>,
}

impl SubscriptionStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `record.product_name`.
    ///
    /// Overwriting keeps the product's original position in iteration order.
    pub fn insert(&mut self, record: SubscriptionRecord) {
        self.records.insert(record.product_name.clone(), record);
    }

    /// Remove the record for a product. Absent products are a no-op.
    pub fn remove(&mut self, product_name: &str) -> Option<SubscriptionRecord> {
        // shift_remove keeps the remaining records in their original order.
        self.records.shift_remove(product_name)
    }

    /// Look up the record for a product.
    #[must_use]
    pub fn get(&self, product_name: &str) -> Option<&SubscriptionRecord> {
        self.records.get(product_name)
    }

    /// Whether a product has an active subscription. O(1) expected.
    #[must_use]
    pub fn contains(&self, product_name: &str) -> bool {
        self.records.contains_key(product_name)
    }

    /// Number of active subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &SubscriptionRecord> {
        self.records.values()
    }

    /// Subscribed product names in insertion order.
    pub fn product_names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Compute aggregate statistics over the current records.
    #[must_use]
    pub fn stats(&self) -> SubscriptionStats {
        let mut email_breakdown: IndexMap<String, usize> = IndexMap::new();
        for record in self.records.values() {
            *email_breakdown
                .entry(record.email.as_str().to_string())
                .or_insert(0) += 1;
        }

        // Earliest subscribedAt wins; on a timestamp tie the record seen
        // first in iteration order is kept.
        let mut oldest: Option<&SubscriptionRecord> = None;
        for record in self.records.values() {
            match oldest {
                Some(current) if record.subscribed_at >= current.subscribed_at => {}
                _ => oldest = Some(record),
            }
        }

        SubscriptionStats {
            total_subscriptions: self.records.len(),
            unique_emails: email_breakdown.len(),
            email_breakdown,
            oldest_subscription: oldest.cloned(),
        }
    }
}

/// Aggregate statistics derived from a [`SubscriptionStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStats {
    /// Count of active subscriptions (equals the store's key count).
    pub total_subscriptions: usize,
    /// Count of distinct addresses across all records.
    pub unique_emails: usize,
    /// Address to number of subscriptions held under it.
    pub email_breakdown: IndexMap<String, usize>,
    /// The record with the minimum `subscribedAt`, `None` when empty.
    pub oldest_subscription: Option<SubscriptionRecord>,
}
