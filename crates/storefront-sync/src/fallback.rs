//! # Fallback Catalog
//!
//! The dataset published by `fetch_all` when the backend cannot be reached.
//!
//! ```text
//! CatalogSettings.fallback_path ──► read ──► parse ──► validate ──┐
//!        │ (unset)                    │ fail    │ fail     │ fail  │ ok
//!        ▼                            ▼         ▼          ▼       ▼
//!   assets/products.json (compiled in) ◄────────┴──────────┘   override file
//! ```
//!
//! The bundled dataset is compiled into the binary, so a substitute always
//! exists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use storefront_core::validation::validate_product;
use storefront_core::Product;
use tracing::{error, info, warn};

use crate::config::CatalogSettings;
use crate::error::SyncResult;

const BUNDLED_PRODUCTS: &str = include_str!("../assets/products.json");

/// Where the fallback dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackSource {
    Bundled,
    File(PathBuf),
}

/// A loaded fallback dataset.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    products: Arc<Vec<Product>>,
    source: FallbackSource,
}

impl FallbackCatalog {
    /// Loads the override file if configured and usable, otherwise the
    /// bundled dataset.
    pub fn load(settings: &CatalogSettings) -> Self {
        if let Some(path) = &settings.fallback_path {
            match read_dataset(path) {
                Ok(products) => {
                    info!(?path, count = products.len(), "Loaded fallback catalog override");
                    return FallbackCatalog {
                        products: Arc::new(products),
                        source: FallbackSource::File(path.clone()),
                    };
                }
                Err(e) => {
                    warn!(?path, error = %e, "Fallback override unusable, using bundled catalog");
                }
            }
        }

        Self::bundled()
    }

    /// The dataset compiled into this crate.
    pub fn bundled() -> Self {
        let products = parse_dataset(BUNDLED_PRODUCTS).unwrap_or_else(|e| {
            error!(error = %e, "Bundled catalog is corrupt");
            Vec::new()
        });

        FallbackCatalog {
            products: Arc::new(products),
            source: FallbackSource::Bundled,
        }
    }

    /// A fresh copy of the dataset.
    pub fn products(&self) -> Vec<Product> {
        self.products.as_ref().clone()
    }

    pub fn source(&self) -> &FallbackSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

fn read_dataset(path: &Path) -> SyncResult<Vec<Product>> {
    let contents = std::fs::read_to_string(path)?;
    parse_dataset(&contents)
}

fn parse_dataset(json: &str) -> SyncResult<Vec<Product>> {
    let products: Vec<Product> = serde_json::from_str(json)?;
    for product in &products {
        validate_product(product)?;
    }
    Ok(products)
}
