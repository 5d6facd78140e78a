//! # Catalog Snapshots
//!
//! Pure edits and queries over a catalog snapshot (`[Product]`).
//!
//! Every edit returns a fresh `Vec` so that a snapshot already handed to a
//! view is never aliased by the next one.
//!
//! ## Query Pipeline
//! ```text
//! snapshot ──► filter(search, category, status) ──► sort ──► page ──► CatalogPage
//!                                                              │
//!                                      total = count after filtering
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use ts_rs::TS;

use crate::types::{InventoryStatus, Product, ProductId};

// =============================================================================
// Snapshot Edits
// =============================================================================

/// Returns a snapshot with `product` placed first.
pub fn prepend(snapshot: &[Product], product: Product) -> Vec<Product> {
    let mut next = Vec::with_capacity(snapshot.len() + 1);
    next.push(product);
    next.extend_from_slice(snapshot);
    next
}

/// Returns a snapshot where every entry with `product.id` is replaced by
/// `product`, plus whether anything matched.
pub fn replace_by_id(snapshot: &[Product], product: &Product) -> (Vec<Product>, bool) {
    let mut matched = false;
    let next = snapshot
        .iter()
        .map(|existing| {
            if existing.id == product.id {
                matched = true;
                product.clone()
            } else {
                existing.clone()
            }
        })
        .collect();
    (next, matched)
}

/// Returns a snapshot without entries carrying `id`, plus whether anything
/// was removed.
pub fn remove_by_id(snapshot: &[Product], id: ProductId) -> (Vec<Product>, bool) {
    let next: Vec<Product> = snapshot
        .iter()
        .filter(|existing| existing.id != id)
        .cloned()
        .collect();
    let removed = next.len() != snapshot.len();
    (next, removed)
}

/// Finds a product by id.
pub fn find_by_id(snapshot: &[Product], id: ProductId) -> Option<&Product> {
    snapshot.iter().find(|product| product.id == id)
}

// =============================================================================
// Catalog Query
// =============================================================================

/// Search, filter, sort and page request over a catalog snapshot.
///
/// `page` is zero-based; `size == 0` disables paging. `sort` is `name`,
/// `price`, `rating` or `quantity`, with a leading `-` for descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(default)]
    pub page: usize,
    #[serde(default)]
    pub size: usize,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<i64>,
    #[serde(default)]
    pub status: Option<InventoryStatus>,
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    pub items: Vec<Product>,
    /// Number of products matching the filters, across all pages.
    pub total: usize,
    pub page: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortKey {
    Name,
    Price,
    Rating,
    Quantity,
}

impl SortKey {
    fn parse(sort: &str) -> Option<(SortKey, bool)> {
        let sort = sort.trim();
        let (descending, key) = match sort.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, sort),
        };
        let key = match key.to_ascii_lowercase().as_str() {
            "name" => SortKey::Name,
            "price" => SortKey::Price,
            "rating" => SortKey::Rating,
            "quantity" => SortKey::Quantity,
            _ => return None,
        };
        Some((key, descending))
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::Rating => a.rating.total_cmp(&b.rating),
            SortKey::Quantity => a.quantity.cmp(&b.quantity),
        }
    }
}

impl CatalogQuery {
    /// Whether a product passes the search and filter criteria.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = self.category {
            if product.category_id != category {
                return false;
            }
        }

        if let Some(status) = self.status {
            if product.inventory_status != status {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [&product.name, &product.code, &product.description]
                    .iter()
                    .any(|text| text.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }

    /// Runs the query against a snapshot. The snapshot is not modified.
    pub fn apply(&self, snapshot: &[Product]) -> CatalogPage {
        let mut matching: Vec<&Product> = snapshot.iter().filter(|p| self.matches(p)).collect();

        if let Some((key, descending)) = self.sort.as_deref().and_then(SortKey::parse) {
            matching.sort_by(|a, b| {
                let ordering = key.compare(a, b);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let total = matching.len();
        let items = if self.size == 0 {
            matching.into_iter().cloned().collect()
        } else {
            match self.page.checked_mul(self.size) {
                Some(offset) => matching
                    .into_iter()
                    .skip(offset)
                    .take(self.size)
                    .cloned()
                    .collect(),
                None => Vec::new(),
            }
        };

        CatalogPage {
            items,
            total,
            page: self.page,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(id: ProductId, name: &str, price_cents: i64, category_id: i64) -> Product {
        Product {
            id,
            code: format!("code-{}", id),
            name: name.to_string(),
            price: Money::from_cents(price_cents),
            category_id,
            ..Product::default()
        }
    }

    fn snapshot() -> Vec<Product> {
        vec![
            product(1, "Bamboo Watch", 6500, 1),
            product(2, "Black Watch", 7200, 1),
            product(3, "Yoga Mat", 2000, 2),
            Product {
                inventory_status: InventoryStatus::OutOfStock,
                ..product(4, "Blue T-Shirt", 2900, 3)
            },
        ]
    }

    #[test]
    fn test_prepend_does_not_alias() {
        let original = snapshot();
        let next = prepend(&original, product(0, "Draft", 100, 1));

        assert_eq!(next.len(), 5);
        assert_eq!(next[0].name, "Draft");
        assert_eq!(original.len(), 4);
    }

    #[test]
    fn test_replace_by_id() {
        let updated = Product {
            name: "Bamboo Watch v2".into(),
            ..snapshot()[0].clone()
        };
        let (next, matched) = replace_by_id(&snapshot(), &updated);

        assert!(matched);
        assert_eq!(find_by_id(&next, 1).map(|p| p.name.as_str()), Some("Bamboo Watch v2"));
        assert_eq!(next.len(), 4);

        let (_, matched) = replace_by_id(&snapshot(), &product(99, "Ghost", 1, 1));
        assert!(!matched);
    }

    #[test]
    fn test_remove_by_id() {
        let (next, removed) = remove_by_id(&snapshot(), 3);
        assert!(removed);
        assert!(find_by_id(&next, 3).is_none());

        let (next, removed) = remove_by_id(&snapshot(), 42);
        assert!(!removed);
        assert_eq!(next, snapshot());
    }

    #[test]
    fn test_query_search_is_case_insensitive() {
        let query = CatalogQuery {
            search: Some("WATCH".into()),
            ..CatalogQuery::default()
        };
        let page = query.apply(&snapshot());
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_query_filters() {
        let by_category = CatalogQuery {
            category: Some(2),
            ..CatalogQuery::default()
        };
        assert_eq!(by_category.apply(&snapshot()).items[0].id, 3);

        let by_status = CatalogQuery {
            status: Some(InventoryStatus::OutOfStock),
            ..CatalogQuery::default()
        };
        assert_eq!(by_status.apply(&snapshot()).items[0].id, 4);
    }

    #[test]
    fn test_query_sort_and_page() {
        let query = CatalogQuery {
            sort: Some("-price".into()),
            page: 1,
            size: 2,
            ..CatalogQuery::default()
        };
        let page = query.apply(&snapshot());
        let ids: Vec<ProductId> = page.items.iter().map(|p| p.id).collect();

        assert_eq!(page.total, 4);
        assert_eq!(ids, vec![4, 3]);
    }

    #[test]
    fn test_query_out_of_range_page() {
        let query = CatalogQuery {
            page: 10,
            size: 2,
            ..CatalogQuery::default()
        };
        let page = query.apply(&snapshot());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 4);
    }

    #[test]
    fn test_unknown_sort_keeps_order() {
        let query = CatalogQuery {
            sort: Some("color".into()),
            ..CatalogQuery::default()
        };
        let ids: Vec<ProductId> = query.apply(&snapshot()).items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
