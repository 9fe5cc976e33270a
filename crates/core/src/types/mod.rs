//! Core types for Restock.
//!
//! This module provides the domain vocabulary shared by the gateway and the
//! test harness: catalog snapshots, validated emails, and the subscription
//! store with its derived statistics.

pub mod email;
pub mod product;
pub mod subscription;

pub use email::{Email, EmailError};
pub use product::{Product, ProductsData};
pub use subscription::{SubscriptionRecord, SubscriptionStats, SubscriptionStore};
