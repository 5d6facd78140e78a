//! # Product Catalog Store
//!
//! Owns the in-memory catalog snapshot, applies optimistic mutations and
//! falls back to a static dataset when the backend is unreachable.
//!
//! ## Operation Policies
//! ```text
//! ┌───────────────┬──────────────────────────────┬──────────────────────────┐
//! │ Operation     │ Backend ok                   │ Backend failed           │
//! ├───────────────┼──────────────────────────────┼──────────────────────────┤
//! │ fetch_all     │ publish server list,         │ publish fallback dataset │
//! │               │ clear diverged ids           │ (warn)                   │
//! │ fetch_one     │ return product               │ return error             │
//! │ create        │ prepend, Confirmed           │ prepend, Diverged (warn) │
//! │ update        │ replace by id, Confirmed     │ replace, Diverged (warn) │
//! │ delete        │ remove by id, Confirmed      │ remove, Diverged (warn)  │
//! │ image         │ return handle                │ return error             │
//! └───────────────┴──────────────────────────────┴──────────────────────────┘
//! ```
//!
//! ## Consistency
//! Local state always moves forward. A mutation the backend rejected leaves
//! the snapshot diverged from the backend; its product id is recorded in
//! [`CatalogStore::diverged_ids`] until the next successful `fetch_all`
//! replaces the whole snapshot.
//! The diverged set only changes inside the snapshot's publication, so a
//! concurrent refresh never clears the id of an entry it did not replace.
//!
//! An in-flight operation never touches the snapshot before its remote call
//! resumes. Concurrent operations race on "last publication wins": a slow
//! `fetch_all` that completes after a local `create` replaces the snapshot
//! and drops the optimistic entry.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use storefront_core::catalog::{self, CatalogPage, CatalogQuery};
use storefront_core::{Product, ProductId};
use tracing::{debug, info, warn};

use crate::api::{ImageFile, ProductApi};
use crate::config::CatalogSettings;
use crate::error::SyncResult;
use crate::fallback::FallbackCatalog;
use crate::images::{ImageHandle, ImageResolver};
use crate::subject::{SnapshotSubject, Subscription};

// =============================================================================
// Outcomes
// =============================================================================

/// Where the snapshot published by `fetch_all` came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The backend answered.
    Remote { count: usize },
    /// The backend failed; the fallback dataset was published.
    Fallback { count: usize, reason: String },
}

impl FetchOutcome {
    pub fn is_fallback(&self) -> bool {
        matches!(self, FetchOutcome::Fallback { .. })
    }

    /// Number of products published.
    pub fn count(&self) -> usize {
        match self {
            FetchOutcome::Remote { count } | FetchOutcome::Fallback { count, .. } => *count,
        }
    }
}

/// What the backend made of an optimistic mutation.
///
/// The local snapshot has been updated either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Confirmed,
    Diverged { reason: String },
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MutationOutcome::Confirmed)
    }
}

// =============================================================================
// Catalog Store
// =============================================================================

/// The product catalog store.
pub struct CatalogStore {
    api: Arc<dyn ProductApi>,
    snapshots: SnapshotSubject<Vec<Product>>,
    fallback: FallbackCatalog,
    diverged: Mutex<BTreeSet<ProductId>>,
    images: ImageResolver,
}

impl CatalogStore {
    /// Creates a store with an empty snapshot.
    pub fn new(api: Arc<dyn ProductApi>, images: ImageResolver, settings: &CatalogSettings) -> Self {
        CatalogStore {
            api,
            snapshots: SnapshotSubject::new(Vec::new()),
            fallback: FallbackCatalog::load(settings),
            diverged: Mutex::new(BTreeSet::new()),
            images,
        }
    }

    fn diverged_lock(&self) -> MutexGuard<'_, BTreeSet<ProductId>> {
        self.diverged
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Subscribes to the catalog: the current snapshot, then every new one.
    pub fn list(&self) -> Subscription<Vec<Product>> {
        self.snapshots.subscribe()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Vec<Product>> {
        self.snapshots.current()
    }

    /// A product from the current snapshot.
    pub fn find(&self, id: ProductId) -> Option<Product> {
        catalog::find_by_id(&self.snapshots.current(), id).cloned()
    }

    /// Runs a search/filter/sort/page query over the current snapshot.
    pub fn query(&self, query: &CatalogQuery) -> CatalogPage {
        query.apply(&self.snapshots.current())
    }

    /// Ids whose last mutation the backend did not confirm, ascending.
    pub fn diverged_ids(&self) -> Vec<ProductId> {
        self.diverged_lock().iter().copied().collect()
    }

    pub fn is_diverged(&self, id: ProductId) -> bool {
        self.diverged_lock().contains(&id)
    }

    /// The dataset `fetch_all` falls back to.
    pub fn fallback(&self) -> &FallbackCatalog {
        &self.fallback
    }

    // =========================================================================
    // Remote Reads
    // =========================================================================

    /// Replaces the snapshot with the backend's catalog, or with the
    /// fallback dataset if the backend fails. Never returns an error.
    pub async fn fetch_all(&self) -> FetchOutcome {
        match self.api.list().await {
            Ok(products) => {
                let count = products.len();
                self.snapshots.publish_with(|_| {
                    self.diverged_lock().clear();
                    products
                });

                info!(count, "Catalog loaded from backend");
                FetchOutcome::Remote { count }
            }
            Err(e) => {
                let products = self.fallback.products();
                let count = products.len();
                self.snapshots.publish(products);

                warn!(error = %e, count, source = ?self.fallback.source(), "Catalog fetch failed, serving fallback dataset");
                FetchOutcome::Fallback {
                    count,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fetches one product from the backend. Failures are returned.
    pub async fn fetch_one(&self, id: ProductId) -> SyncResult<Product> {
        let product = self.api.get(id).await.map_err(|e| {
            warn!(product_id = id, error = %e, "Failed to fetch product");
            e
        })?;
        debug!(product_id = id, "Fetched product");
        Ok(product)
    }

    /// Resolves the product's image into a handle owned by the caller.
    pub async fn image(&self, id: ProductId) -> SyncResult<ImageHandle> {
        self.images.resolve(id).await
    }

    // =========================================================================
    // Optimistic Mutations
    // =========================================================================

    /// Creates a product on the backend and prepends it locally, whatever
    /// the backend answered. The product keeps the id the caller gave it.
    pub async fn create(&self, product: Product, image: ImageFile) -> MutationOutcome {
        let result = self.api.create(&product.fields(), &image).await;
        let outcome = Self::settle("create", product.id, result);

        self.snapshots.publish_with(|current| {
            self.track(product.id, &outcome);
            catalog::prepend(current, product)
        });
        outcome
    }

    /// Updates a product on the backend and replaces the local entry with
    /// the same id, whatever the backend answered.
    pub async fn update(&self, product: Product) -> MutationOutcome {
        let result = self.api.update(product.id, &product.fields()).await;
        let outcome = Self::settle("update", product.id, result);

        self.snapshots.publish_with(|current| {
            self.track(product.id, &outcome);
            let (next, matched) = catalog::replace_by_id(current, &product);
            if !matched {
                debug!(product_id = product.id, "Updated product is not in the catalog");
            }
            next
        });
        outcome
    }

    /// Deletes a product on the backend and removes it locally, whatever
    /// the backend answered.
    pub async fn delete(&self, id: ProductId) -> MutationOutcome {
        let result = self.api.delete(id).await.map(|()| true);
        let outcome = Self::settle("delete", id, result);

        self.snapshots.publish_with(|current| {
            self.track(id, &outcome);
            let (next, removed) = catalog::remove_by_id(current, id);
            if !removed {
                debug!(product_id = id, "Deleted product was not in the catalog");
            }
            next
        });
        outcome
    }

    /// Logs the backend's answer.
    fn settle(operation: &'static str, id: ProductId, result: SyncResult<bool>) -> MutationOutcome {
        let reason = match result {
            Ok(true) => {
                info!(operation, product_id = id, "Backend confirmed mutation");
                return MutationOutcome::Confirmed;
            }
            Ok(false) => "backend declined the request".to_string(),
            Err(e) => e.to_string(),
        };

        warn!(operation, product_id = id, reason = %reason, "Backend mutation failed, local catalog diverged");
        MutationOutcome::Diverged { reason }
    }

    /// Records the outcome in the diverged set.
    ///
    /// Must run inside the snapshot's `publish_with` so the set and the
    /// snapshot change together; lock order is snapshot, then diverged.
    fn track(&self, id: ProductId, outcome: &MutationOutcome) {
        let mut diverged = self.diverged_lock();
        if outcome.is_confirmed() {
            diverged.remove(&id);
        } else {
            diverged.insert(id);
        }
    }
}

impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("products", &self.snapshots.current().len())
            .field("diverged", &self.diverged_ids())
            .field("subscribers", &self.snapshots.subscriber_count())
            .finish()
    }
}
