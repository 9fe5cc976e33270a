//! Restock Core - Shared types library.
//!
//! This crate provides the domain types used across Restock components:
//! - `gateway` - HTTP gateway between the user and the upstream services
//! - `integration-tests` - End-to-end test harness
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. Catalog snapshots and subscription records are plain data; every
//! mutation with side effects lives in the gateway crate.
//!
//! # Modules
//!
//! - [`types`] - Products, catalog mappings, emails, and subscription records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
