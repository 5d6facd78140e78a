//! # storefront-sync: Client-Side State Synchronization
//!
//! Keeps an in-memory view of "what the backend has" and "what the visitor
//! is doing" consistent, tolerant of backend failure, and observable by any
//! number of views.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Synchronization Layer                            │
//! │                                                                         │
//! │   View ──intent──► ┌──────────────────────────────────────────────┐     │
//! │                    │                 Storefront                   │     │
//! │                    │                                              │     │
//! │                    │  ┌──────────────┐        ┌────────────────┐  │     │
//! │                    │  │ CatalogStore │        │   CartEngine   │  │     │
//! │                    │  │              │        │                │  │     │
//! │                    │  │ optimistic   │        │ merge-add,     │  │     │
//! │                    │  │ CRUD,        │        │ set, remove,   │  │     │
//! │                    │  │ fallback     │        │ count, total   │  │     │
//! │                    │  └──────┬───────┘        └───────┬────────┘  │     │
//! │                    │         │ SnapshotSubject        │           │     │
//! │                    │         │                        │           │     │
//! │                    │  ┌──────▼───────┐                │           │     │
//! │                    │  │ImageResolver │                │           │     │
//! │                    │  │ blob handles │                │           │     │
//! │                    │  └──────┬───────┘                │           │     │
//! │                    └─────────┼────────────────────────┼───────────┘     │
//! │                              │                        │                 │
//! │   View ◄──snapshots──────────┴────────────────────────┘                 │
//! │                              │                                          │
//! │                    ┌─────────▼─────────┐      ┌───────────────────┐     │
//! │                    │  dyn ProductApi   │─────►│  HttpProductApi   │     │
//! │                    └───────────────────┘      │  (reqwest)        │     │
//! │                                               └───────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - `ProductApi` trait, the transport seam
//! - [`http`] - `reqwest` implementation of the seam
//! - [`subject`] - Snapshot subjects and subscriptions
//! - [`catalog_store`] - Product catalog store
//! - [`cart_engine`] - Cart aggregation engine
//! - [`images`] - Image resolver and revocable handles
//! - [`fallback`] - Bundled / override fallback catalog
//! - [`session`] - `Storefront` session container
//! - [`config`] - TOML + env configuration
//! - [`error`] - Sync error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_sync::{Storefront, StorefrontConfig};
//!
//! let config = StorefrontConfig::load_or_default(None);
//! let session = Storefront::from_config(&config)?;
//!
//! let mut products = session.catalog().list();
//! session.catalog().fetch_all().await;
//! let snapshot = products.next().await;
//!
//! if let Some(first) = session.catalog().snapshot().first() {
//!     session.cart().add(first, 1)?;
//! }
//! println!("Total: {}", session.cart().total());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod cart_engine;
pub mod catalog_store;
pub mod config;
pub mod error;
pub mod fallback;
pub mod http;
pub mod images;
pub mod session;
pub mod subject;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{ImageData, ImageFile, ProductApi};
pub use cart_engine::CartEngine;
pub use catalog_store::{CatalogStore, FetchOutcome, MutationOutcome};
pub use config::{ApiSettings, CatalogSettings, ImageSettings, StorefrontConfig};
pub use error::{SyncError, SyncResult};
pub use fallback::{FallbackCatalog, FallbackSource};
pub use http::HttpProductApi;
pub use images::{ImageHandle, ImageResolver};
pub use session::Storefront;
pub use subject::{SnapshotSubject, Subscription};
