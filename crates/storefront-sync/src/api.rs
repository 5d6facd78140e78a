//! # Product API Seam
//!
//! The logical requests the synchronization layer issues to the backend.
//!
//! ```text
//! CatalogStore / ImageResolver ──► dyn ProductApi ──┬─► HttpProductApi (reqwest)
//!                                                    └─► MockProductApi (tests)
//! ```
//!
//! Implementations report transport and backend failures as [`SyncError`];
//! what to do with them (fallback, optimistic apply, propagate) is decided
//! by the callers.

use async_trait::async_trait;
use storefront_core::{Product, ProductFields, ProductId};

#[cfg(test)]
use mockall::automock;

use crate::error::SyncResult;

/// An image file attached to a product creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        ImageFile {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Raw image bytes as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageData {
    /// `Content-Type` reported by the backend, if any.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Backend operations on the products resource.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProductApi: Send + Sync {
    /// `GET /` - the full catalog.
    async fn list(&self) -> SyncResult<Vec<Product>>;

    /// `GET /{id}` - one product.
    async fn get(&self, id: ProductId) -> SyncResult<Product>;

    /// `POST /` (multipart) - returns the backend's acknowledgement.
    async fn create(&self, fields: &ProductFields, image: &ImageFile) -> SyncResult<bool>;

    /// `PATCH /{id}` (JSON) - returns the backend's acknowledgement.
    async fn update(&self, id: ProductId, fields: &ProductFields) -> SyncResult<bool>;

    /// `DELETE /{id}`.
    async fn delete(&self, id: ProductId) -> SyncResult<()>;

    /// `GET /productImage/{id}` - raw image bytes.
    async fn image(&self, id: ProductId) -> SyncResult<ImageData>;
}
