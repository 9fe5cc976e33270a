//! Subscription reconciliation between the local store and the upstream
//! notification service.
//!
//! [`SubscriptionService`] is the single owner of subscription state and the
//! only component allowed to mutate the persistent store. The ordering is
//! fixed: remote first, local second. A record is written only after the
//! upstream confirmed the subscribe, and removed only after it confirmed the
//! unsubscribe, so the local store never claims a subscription the upstream
//! does not know about. There is no distributed transaction backing this -
//! the invariant is purely "local never runs ahead of confirmed remote".

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};

use restock_core::{Email, EmailError, SubscriptionRecord, SubscriptionStats, SubscriptionStore};

use crate::services::notifier::{NotifierClient, NotifyError};
use crate::storage::{StorageCorruption, StorageError, SubscriptionStorage};

/// Errors that can occur during a reconciled subscribe or unsubscribe.
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The submitted email failed validation. No upstream call was made.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The upstream call failed. The local store was left untouched.
    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// The upstream confirmed but the local write failed. The remote now
    /// holds a subscription the local store does not show.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owner of the subscription state and orchestrator of user actions.
pub struct SubscriptionService {
    notifier: NotifierClient,
    storage: SubscriptionStorage,
    store: Mutex<SubscriptionStore>,
    /// Per-product locks serializing subscribe/unsubscribe for the same
    /// product, so a fast unsubscribe-then-subscribe cannot be reordered by
    /// the network. Grows with distinct product names, bounded by catalog
    /// size.
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SubscriptionService {
    /// Load the persisted store and build the service.
    ///
    /// A corrupt store is replaced by an empty one; the warning is returned
    /// for the caller to surface (startup must not fail over it).
    #[must_use]
    pub fn load(
        notifier: NotifierClient,
        storage: SubscriptionStorage,
    ) -> (Self, Option<StorageCorruption>) {
        let (store, warning) = storage.load();

        let service = Self {
            notifier,
            storage,
            store: Mutex::new(store),
            in_flight: Mutex::new(HashMap::new()),
        };
        (service, warning)
    }

    /// Subscribe `email` to back-in-stock notifications for `product_name`.
    ///
    /// The email is validated before any network call. The local record is
    /// written only after the upstream accepted the request; on any upstream
    /// failure the store is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError`] on invalid input, upstream failure, or
    /// a failed local write after upstream confirmation.
    pub async fn subscribe_to(
        &self,
        product_name: &str,
        email: &str,
    ) -> Result<SubscriptionRecord, SubscriptionError> {
        let email = Email::parse(email)?;

        let _guard = self.lock_product(product_name).await;
        self.notifier.subscribe(&email, product_name).await?;

        let mut store = self.store.lock().await;
        let (next, record) = self.storage.add(&store, product_name, email)?;
        *store = next;

        tracing::info!(product = product_name, "subscription recorded");
        Ok(record)
    }

    /// Withdraw the subscription for `product_name`.
    ///
    /// The upstream unsubscribe is bound to the email in the stored record
    /// when one exists - the address originally used to subscribe - rather
    /// than whatever the caller submitted, so editing the email field between
    /// subscribe and unsubscribe cannot desynchronize the two sides. The
    /// submitted email is used (and validated) only when no record exists.
    ///
    /// # Errors
    ///
    /// Returns [`SubscriptionError`] on invalid input, upstream failure, or
    /// a failed local write after upstream confirmation.
    pub async fn unsubscribe_from(
        &self,
        product_name: &str,
        submitted_email: &str,
    ) -> Result<(), SubscriptionError> {
        let _guard = self.lock_product(product_name).await;

        let email = {
            let store = self.store.lock().await;
            store.get(product_name).map(|record| record.email.clone())
        };
        let email = match email {
            Some(recorded) => recorded,
            None => Email::parse(submitted_email)?,
        };

        self.notifier.unsubscribe(&email, product_name).await?;

        let mut store = self.store.lock().await;
        let next = self.storage.remove(&store, product_name)?;
        *store = next;

        tracing::info!(product = product_name, "subscription removed");
        Ok(())
    }

    /// Drop every local subscription and the cached email.
    ///
    /// Purely local: the upstream notification service is not informed and
    /// will keep its registrations active. That asymmetry is logged rather
    /// than hidden.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the persisted store cannot be rewritten.
    pub async fn clear_all(&self) -> Result<(), StorageError> {
        let mut store = self.store.lock().await;
        let dropped = store.len();
        *store = self.storage.clear()?;

        if dropped > 0 {
            tracing::warn!(
                dropped,
                "cleared local subscriptions; upstream registrations remain active and may keep emailing"
            );
        }
        Ok(())
    }

    /// Whether `product_name` has an active subscription.
    pub async fn subscribed(&self, product_name: &str) -> bool {
        self.store.lock().await.contains(product_name)
    }

    /// Snapshot of the current store.
    pub async fn snapshot(&self) -> SubscriptionStore {
        self.store.lock().await.clone()
    }

    /// Aggregate statistics over the current store.
    pub async fn stats(&self) -> SubscriptionStats {
        self.store.lock().await.stats()
    }

    /// Cached last-used email for pre-filling subscription forms.
    #[must_use]
    pub fn last_email(&self) -> Option<String> {
        self.storage.last_email()
    }

    async fn lock_product(&self, product_name: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.in_flight.lock().await;
            Arc::clone(
                map.entry(product_name.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
