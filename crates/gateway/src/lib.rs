//! Restock Gateway library.
//!
//! This crate provides the gateway functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod reconciler;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
pub mod view;
