//! Durable key-value storage for the subscription store.
//!
//! The layout mirrors the browser storage the service replaced: one file per
//! key inside the configured data directory. `productSubscriptions` holds the
//! JSON-encoded store mapping, `userEmail` holds the last-used address as a
//! plain string (not JSON-wrapped) for pre-filling subscription forms.
//!
//! Every write is a full overwrite through a temp file followed by a rename,
//! so a crash mid-write never leaves a partially visible store.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use restock_core::{Email, SubscriptionRecord, SubscriptionStore};

/// Storage key for the JSON-encoded subscription mapping.
pub const SUBSCRIPTIONS_KEY: &str = "productSubscriptions";

/// Storage key for the last-used email (plain string).
pub const USER_EMAIL_KEY: &str = "userEmail";

/// Errors that can occur when persisting the subscription store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing a storage file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store could not be encoded as JSON.
    #[error("failed to encode subscription store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Non-fatal notice that the durable store was unreadable and reset.
///
/// Raised by [`SubscriptionStorage::load`] instead of an error: a corrupt
/// store must never prevent startup, the user just loses their saved
/// subscriptions and sees a warning.
#[derive(Debug, Clone, Error)]
#[error("subscription storage was unreadable and has been reset: {detail}")]
pub struct StorageCorruption {
    /// Human-readable description of what was wrong with the stored data.
    pub detail: String,
}

/// File-backed persistence for the subscription store.
///
/// All operations take the caller's current store by reference and return the
/// persisted successor, so the in-memory copy only ever advances to states
/// that are already durable.
#[derive(Debug, Clone)]
pub struct SubscriptionStorage {
    dir: PathBuf,
}

impl SubscriptionStorage {
    /// Create a storage handle rooted at `dir`. The directory is created
    /// lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load the persisted store.
    ///
    /// A missing file yields an empty store. Malformed or unreadable data
    /// also yields an empty store, together with a [`StorageCorruption`]
    /// warning for the caller to surface - load never fails.
    #[must_use]
    pub fn load(&self) -> (SubscriptionStore, Option<StorageCorruption>) {
        let path = self.key_path(SUBSCRIPTIONS_KEY);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return (SubscriptionStore::new(), None);
            }
            Err(e) => {
                return (
                    SubscriptionStore::new(),
                    Some(StorageCorruption {
                        detail: format!("could not read {}: {e}", path.display()),
                    }),
                );
            }
        };

        match serde_json::from_str::<SubscriptionStore>(&raw) {
            Ok(store) => (store, None),
            Err(e) => (
                SubscriptionStore::new(),
                Some(StorageCorruption {
                    detail: format!("invalid JSON in {}: {e}", path.display()),
                }),
            ),
        }
    }

    /// Persist the full store (atomic overwrite).
    ///
    /// Also records the most-recently-used email for form pre-fill: records
    /// are visited in mapping iteration order and the last writer wins. An
    /// empty store leaves the cached email untouched.
    pub fn save(&self, store: &SubscriptionStore) -> Result<(), StorageError> {
        let json = serde_json::to_string(store)?;
        self.write_atomic(SUBSCRIPTIONS_KEY, &json)?;

        if let Some(last) = store.records().last() {
            self.write_atomic(USER_EMAIL_KEY, last.email.as_str())?;
        }

        Ok(())
    }

    /// Insert or overwrite the record for `product_name` and persist.
    ///
    /// Returns the persisted successor store and the record that was written.
    pub fn add(
        &self,
        store: &SubscriptionStore,
        product_name: &str,
        email: Email,
    ) -> Result<(SubscriptionStore, SubscriptionRecord), StorageError> {
        let record = SubscriptionRecord {
            email,
            subscribed_at: Utc::now(),
            product_name: product_name.to_string(),
        };

        let mut next = store.clone();
        next.insert(record.clone());
        self.save(&next)?;
        Ok((next, record))
    }

    /// Delete the record for `product_name` (no-op if absent) and persist.
    pub fn remove(
        &self,
        store: &SubscriptionStore,
        product_name: &str,
    ) -> Result<SubscriptionStore, StorageError> {
        let mut next = store.clone();
        next.remove(product_name);
        self.save(&next)?;
        Ok(next)
    }

    /// Reset to an empty store and erase the cached last-used email.
    pub fn clear(&self) -> Result<SubscriptionStore, StorageError> {
        let empty = SubscriptionStore::new();
        let json = serde_json::to_string(&empty)?;
        self.write_atomic(SUBSCRIPTIONS_KEY, &json)?;

        let email_path = self.key_path(USER_EMAIL_KEY);
        match fs::remove_file(&email_path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StorageError::Io {
                    path: email_path,
                    source,
                });
            }
        }

        Ok(empty)
    }

    /// Read the cached last-used email, if any.
    #[must_use]
    pub fn last_email(&self) -> Option<String> {
        fs::read_to_string(self.key_path(USER_EMAIL_KEY)).ok()
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    /// Write a storage key atomically: temp file in the same directory, then
    /// rename over the target (UUID suffix avoids collisions).
    fn write_atomic(&self, key: &str, contents: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.key_path(key);
        let tmp_path = self.dir.join(format!("{key}.tmp.{}", Uuid::new_v4()));

        fs::write(&tmp_path, contents).map_err(|source| StorageError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }
}
