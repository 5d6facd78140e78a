//! # Image Resource Resolver
//!
//! Fetches product images and hands out revocable, process-local handles.
//!
//! ## Handle Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  resolve(id) ──► ProductApi::image(id) ──► HandleRegistry::register     │
//! │                                                  │                      │
//! │                                                  ▼                      │
//! │                      ImageHandle { url: "blob:storefront/<uuid>" }      │
//! │                                                  │                      │
//! │            view displays url, reads bytes via ImageResolver::open       │
//! │                                                  │                      │
//! │                     release() or drop ──► revoke(url), bytes freed      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A handle the view never releases stays live for the whole session. The
//! registry counts live handles and warns when the count crosses the
//! configured threshold.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use storefront_core::ProductId;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::{ImageData, ProductApi};
use crate::config::ImageSettings;
use crate::error::{SyncError, SyncResult};

/// Prefix of every handle URL.
pub const HANDLE_URL_PREFIX: &str = "blob:storefront/";

// =============================================================================
// Handle Registry
// =============================================================================

/// Process-local table of live handles.
#[derive(Debug)]
pub struct HandleRegistry {
    entries: Mutex<HashMap<String, Arc<ImageData>>>,
    leak_warning_threshold: usize,
}

impl HandleRegistry {
    pub fn new(settings: &ImageSettings) -> Self {
        HandleRegistry {
            entries: Mutex::new(HashMap::new()),
            leak_warning_threshold: settings.leak_warning_threshold,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<ImageData>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn register(self: &Arc<Self>, product_id: ProductId, data: ImageData) -> ImageHandle {
        let url = format!("{}{}", HANDLE_URL_PREFIX, Uuid::new_v4());

        let live = {
            let mut entries = self.lock();
            entries.insert(url.clone(), Arc::new(data));
            entries.len()
        };

        if live == self.leak_warning_threshold.saturating_add(1) {
            warn!(
                live,
                threshold = self.leak_warning_threshold,
                "Image handles are not being released"
            );
        }

        debug!(product_id, url = %url, live, "Image handle created");
        ImageHandle {
            url,
            product_id,
            registry: Arc::clone(self),
        }
    }

    fn revoke(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    fn open(&self, url: &str) -> Option<Arc<ImageData>> {
        self.lock().get(url).cloned()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}

// =============================================================================
// Image Handle
// =============================================================================

/// An owned, revocable reference to a fetched image.
///
/// The URL stays valid until the handle is released or dropped.
pub struct ImageHandle {
    url: String,
    product_id: ProductId,
    registry: Arc<HandleRegistry>,
}

impl ImageHandle {
    /// Displayable URL (`blob:storefront/<uuid>`).
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// The image bytes while the handle is live.
    pub fn data(&self) -> Option<Arc<ImageData>> {
        self.registry.open(&self.url)
    }

    /// Revokes the URL now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        if self.registry.revoke(&self.url) {
            debug!(product_id = self.product_id, url = %self.url, "Image handle released");
        }
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandle")
            .field("url", &self.url)
            .field("product_id", &self.product_id)
            .finish()
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Turns product ids into image handles.
#[derive(Clone)]
pub struct ImageResolver {
    api: Arc<dyn ProductApi>,
    registry: Arc<HandleRegistry>,
}

impl ImageResolver {
    pub fn new(api: Arc<dyn ProductApi>, settings: &ImageSettings) -> Self {
        ImageResolver {
            api,
            registry: Arc::new(HandleRegistry::new(settings)),
        }
    }

    /// Fetches the image for a product and registers a handle for it.
    ///
    /// Transport and backend failures are returned as-is; no placeholder is
    /// produced.
    pub async fn resolve(&self, product_id: ProductId) -> SyncResult<ImageHandle> {
        let data = self.api.image(product_id).await.map_err(|e| {
            warn!(product_id, error = %e, "Failed to fetch product image");
            e
        })?;
        Ok(self.registry.register(product_id, data))
    }

    /// Reads the bytes behind a handle URL. `None` once it has been revoked.
    pub fn open(&self, url: &str) -> Option<Arc<ImageData>> {
        self.registry.open(url)
    }

    /// Like [`open`](Self::open), for callers that treat a stale URL as an error.
    pub fn read(&self, url: &str) -> SyncResult<Arc<ImageData>> {
        self.open(url)
            .ok_or_else(|| SyncError::HandleRevoked(url.to_string()))
    }

    /// Number of handles not yet released.
    pub fn live_handles(&self) -> usize {
        self.registry.len()
    }
}

impl fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageResolver")
            .field("live_handles", &self.live_handles())
            .finish()
    }
}
