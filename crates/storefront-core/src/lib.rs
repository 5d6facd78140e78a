//! # storefront-core: Pure Domain Logic for the Storefront Client
//!
//! This crate holds the storefront's domain model and every rule that can be
//! checked without I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Client Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                View Orchestrators (not in workspace)            │   │
//! │  │     Product list ──► Product detail ──► Cart ──► Admin form     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshots / intents                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                      storefront-sync                            │   │
//! │  │     CatalogStore, CartEngine, ImageResolver, HTTP transport     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  catalog  │  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │  edits,   │  │   │
//! │  │   │ CartLine  │  │  (cents)  │  │  merge    │  │  queries  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO ASYNC • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartLine, Category, InventoryStatus)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - Cart aggregate with merge semantics
//! - [`catalog`] - Snapshot edits and catalog queries
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::{Cart, Money, Product};
//!
//! let watch = Product { id: 1, price: Money::from_cents(999), ..Product::default() };
//! let mat = Product { id: 2, price: Money::from_cents(500), ..Product::default() };
//!
//! let mut cart = Cart::new();
//! cart.add(&watch, 3).unwrap();
//! cart.add(&mat, 2).unwrap();
//!
//! assert_eq!(cart.len(), 2);
//! assert_eq!(cart.total().to_string(), "$39.97");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use catalog::{CatalogPage, CatalogQuery};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
