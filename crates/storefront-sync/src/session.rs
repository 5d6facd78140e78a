//! # Storefront Session
//!
//! The explicitly constructed container for one client session.
//!
//! ```text
//! Storefront
//!   ├── CatalogStore ──┐
//!   ├── CartEngine     ├── share one Arc<dyn ProductApi>
//!   └── ImageResolver ─┘
//! ```
//!
//! Each `Storefront` owns its own state; two sessions (or two tests) never
//! see each other's catalog or cart. Dropping it tears everything down,
//! including any image handle the views did not release.

use std::sync::Arc;

use tracing::info;

use crate::api::ProductApi;
use crate::cart_engine::CartEngine;
use crate::catalog_store::CatalogStore;
use crate::config::StorefrontConfig;
use crate::error::SyncResult;
use crate::http::HttpProductApi;
use crate::images::ImageResolver;

/// One client session: catalog, cart and images.
#[derive(Debug, Clone)]
pub struct Storefront {
    catalog: Arc<CatalogStore>,
    cart: Arc<CartEngine>,
    images: ImageResolver,
}

impl Storefront {
    /// Validates the config and wires the HTTP transport.
    pub fn from_config(config: &StorefrontConfig) -> SyncResult<Self> {
        config.validate()?;
        let api = HttpProductApi::new(&config.api)?;
        info!(url = %api.products_url(), "Storefront session using HTTP backend");

        Ok(Self::with_api(Arc::new(api), config))
    }

    /// Wires the session around any [`ProductApi`] implementation.
    pub fn with_api(api: Arc<dyn ProductApi>, config: &StorefrontConfig) -> Self {
        let images = ImageResolver::new(Arc::clone(&api), &config.images);
        let catalog = CatalogStore::new(api, images.clone(), &config.catalog);
        let cart = CartEngine::new();

        Storefront {
            catalog: Arc::new(catalog),
            cart: Arc::new(cart),
            images,
        }
    }

    pub fn catalog(&self) -> &Arc<CatalogStore> {
        &self.catalog
    }

    pub fn cart(&self) -> &Arc<CartEngine> {
        &self.cart
    }

    pub fn images(&self) -> &ImageResolver {
        &self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ImageData, MockProductApi};
    use crate::error::SyncError;
    use storefront_core::{Money, Product};

    fn mock() -> MockProductApi {
        let mut mock = MockProductApi::new();
        mock.expect_list().returning(|| {
            Ok(vec![Product {
                id: 1,
                code: "f230fh0g3".into(),
                name: "Bamboo Watch".into(),
                price: Money::from_cents(6500),
                quantity: 24,
                ..Product::default()
            }])
        });
        mock.expect_image().returning(|_| {
            Ok(ImageData {
                content_type: None,
                bytes: vec![1],
            })
        });
        mock
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = StorefrontConfig::default();
        config.api.base_url = "ws://localhost".into();

        let err = Storefront::from_config(&config).unwrap_err();
        assert!(matches!(err, SyncError::InvalidUrl(_)));
    }

    #[test]
    fn test_from_config_builds_http_session() {
        let session = Storefront::from_config(&StorefrontConfig::default()).unwrap();
        assert!(session.catalog().snapshot().is_empty());
        assert_eq!(session.cart().count(), 0);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let config = StorefrontConfig::default();
        let first = Storefront::with_api(Arc::new(mock()), &config);
        let second = Storefront::with_api(Arc::new(mock()), &config);

        first.catalog().fetch_all().await;
        let watch = first.catalog().find(1).unwrap();
        first.cart().add(&watch, 2).unwrap();

        assert_eq!(first.cart().count(), 1);
        assert_eq!(second.cart().count(), 0);
        assert!(second.catalog().snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_and_resolver_share_handles() {
        let session = Storefront::with_api(Arc::new(mock()), &StorefrontConfig::default());

        let handle = session.catalog().image(1).await.unwrap();
        assert_eq!(session.images().live_handles(), 1);
        assert!(session.images().open(handle.url()).is_some());

        handle.release();
        assert_eq!(session.images().live_handles(), 0);
    }

    #[tokio::test]
    async fn test_view_copy_carries_image_url() {
        let session = Storefront::with_api(Arc::new(mock()), &StorefrontConfig::default());
        session.catalog().fetch_all().await;

        let handle = session.images().resolve(1).await.unwrap();
        let shown = session.catalog().find(1).unwrap().with_image(handle.url());

        assert_eq!(shown.image.as_deref(), Some(handle.url()));
        assert!(session.catalog().find(1).unwrap().image.is_none());
    }
}
