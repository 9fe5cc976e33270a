//! Catalog product snapshot types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single product as reported by the upstream catalog service.
///
/// Products are identified by their name, the unique key of the surrounding
/// catalog mapping, so no identifier lives on the product itself. The snapshot
/// is immutable: the gateway never edits catalog data, it only relays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Availability flag from upstream: 1 when in stock, 0 when out of stock.
    pub available: u8,
    /// Listed price in the vendor's currency.
    pub price: f64,
    /// Product image URLs in upstream order.
    pub images: Vec<String>,
}

impl Product {
    /// Whether the upstream currently reports this product as in stock.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available == 1
    }
}

/// A catalog snapshot: product name to [`Product`], in upstream order.
///
/// Two instances exist side by side at any time - the "all" view and the
/// "available" view - fetched independently from the upstream service. The
/// available view is expected to be a subset of the all view, but that is an
/// upstream promise, never recomputed or enforced here. Iteration order
/// matters downstream (search filtering, statistics tie-breaks), hence the
/// insertion-ordered map.
pub type ProductsData = IndexMap<String, Product>;
