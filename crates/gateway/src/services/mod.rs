//! Upstream service clients.
//!
//! Both clients are thin pass-through gateways: request/response translation
//! and uniform error mapping, no business logic and no local side effects.
//!
//! - [`catalog`] - fetches the two overlapping catalog views
//! - [`notifier`] - forwards subscribe/unsubscribe requests

pub mod catalog;
pub mod notifier;

pub use catalog::{CatalogClient, FetchError};
pub use notifier::{NotifierClient, NotifyAction, NotifyError};
