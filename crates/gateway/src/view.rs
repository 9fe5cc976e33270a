//! Catalog presentation: view selection, search filtering, and merging with
//! subscription state.
//!
//! The two catalog views are presented as fetched - "available" is whatever
//! the upstream independently reports, never recomputed from "all" by
//! filtering the availability flag.

use core::fmt;

use serde::{Deserialize, Serialize};

use restock_core::{Product, ProductsData, SubscriptionStore};

/// Which of the two fetched catalog mappings to present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// The full product list.
    #[default]
    All,
    /// The currently-available subset, as reported upstream.
    Available,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Available => "available",
        })
    }
}

/// One product as presented to the user: catalog snapshot plus whether a
/// subscription is active for it.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    /// Product name, the catalog mapping key.
    pub name: String,
    #[serde(flatten)]
    pub product: Product,
    /// Whether the local store holds an active subscription for this product.
    pub subscribed: bool,
}

/// Filter a catalog by case-insensitive substring match on product name.
///
/// Preserves the mapping's iteration order; an empty search term yields every
/// entry.
pub fn filter<'a>(
    products: &'a ProductsData,
    search_term: &str,
) -> impl Iterator<Item = (&'a String, &'a Product)> {
    let needle = search_term.to_lowercase();
    products
        .iter()
        .filter(move |(name, _)| name.to_lowercase().contains(&needle))
}

/// Build user-facing entries: filtered catalog merged with the subscription
/// key set.
#[must_use]
pub fn entries(
    products: &ProductsData,
    search_term: &str,
    store: &SubscriptionStore,
) -> Vec<CatalogEntry> {
    filter(products, search_term)
        .map(|(name, product)| CatalogEntry {
            name: name.clone(),
            product: product.clone(),
            subscribed: store.contains(name),
        })
        .collect()
}

/// Log a discrepancy if the "available" view lists products the "all" view
/// does not know. The subset relation is an upstream promise from two
/// independent fetches; it is checked and reported, never enforced.
pub fn check_available_subset(all: &ProductsData, available: &ProductsData) {
    let missing: Vec<&str> = available
        .keys()
        .filter(|name| !all.contains_key(*name))
        .map(String::as_str)
        .collect();

    if !missing.is_empty() {
        tracing::warn!(
            products = ?missing,
            "available catalog lists products missing from the all catalog"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn catalog(names: &[(&str, u8)]) -> ProductsData {
        names
            .iter()
            .map(|(name, available)| {
                (
                    (*name).to_string(),
                    Product {
                        available: *available,
                        price: 10.0,
                        images: vec![],
                    },
                )
            })
            .collect()
    }

    #[test]
    fn filter_is_case_insensitive() {
        let products = catalog(&[("High Protein Milk", 0), ("Buttermilk", 1), ("Ghee", 0)]);

        let lower: Vec<_> = filter(&products, "milk").map(|(n, _)| n.clone()).collect();
        let upper: Vec<_> = filter(&products, "MILK").map(|(n, _)| n.clone()).collect();

        assert_eq!(lower, ["High Protein Milk", "Buttermilk"]);
        assert_eq!(lower, upper);
    }

    #[test]
    fn empty_search_yields_all_in_order() {
        let products = catalog(&[("X", 0), ("Y", 1)]);

        let names: Vec<_> = filter(&products, "").map(|(n, _)| n.clone()).collect();
        assert_eq!(names, ["X", "Y"]);
    }

    #[test]
    fn no_match_yields_nothing() {
        let products = catalog(&[("X", 0)]);
        assert_eq!(filter(&products, "zzz").count(), 0);
    }

    #[test]
    fn entries_carry_subscription_flags() {
        let products = catalog(&[("X", 0), ("Y", 1)]);
        let mut store = SubscriptionStore::new();
        store.insert(restock_core::SubscriptionRecord {
            email: restock_core::Email::parse("a@x.com").unwrap(),
            subscribed_at: chrono::Utc::now(),
            product_name: "X".to_string(),
        });

        let entries = entries(&products, "", &store);
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().find(|e| e.name == "X").unwrap().subscribed);
        assert!(!entries.iter().find(|e| e.name == "Y").unwrap().subscribed);
    }

    #[test]
    fn entry_serializes_product_fields_inline() {
        let products = catalog(&[("X", 1)]);
        let entries = entries(&products, "", &SubscriptionStore::new());

        let json = serde_json::to_value(entries.first().unwrap()).unwrap();
        assert_eq!(json["name"], "X");
        assert_eq!(json["available"], 1);
        assert_eq!(json["subscribed"], false);
    }

    #[test]
    fn subset_check_tolerates_consistent_views() {
        let all = catalog(&[("X", 0), ("Y", 1)]);
        let available = catalog(&[("Y", 1)]);
        // Only asserts it does not panic; the discrepancy path logs a warning.
        check_available_subset(&all, &available);

        let rogue = catalog(&[("Z", 1)]);
        check_available_subset(&all, &rogue);
    }

    #[test]
    fn catalog_kind_query_forms() {
        assert_eq!(CatalogKind::default(), CatalogKind::All);
        assert_eq!(CatalogKind::All.to_string(), "all");
        assert_eq!(CatalogKind::Available.to_string(), "available");

        let kind: CatalogKind = serde_json::from_str("\"available\"").unwrap();
        assert_eq!(kind, CatalogKind::Available);
    }
}
