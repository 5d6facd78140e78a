//! # Domain Types
//!
//! Core domain types shared by the catalog store, the cart engine and views.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartLine     │   │  ProductFields  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (backend)   │   │  product        │   │  mutable subset │       │
//! │  │  code, name     │◄──│  quantity ≥ 1   │   │  (PATCH body,   │       │
//! │  │  price (Money)  │   └─────────────────┘   │   create form)  │       │
//! │  │  quantity       │                         └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │ InventoryStatus │   │    Category     │                             │
//! │  │  INSTOCK        │   │  1 Accessories  │                             │
//! │  │  LOWSTOCK       │   │  2 Fitness      │                             │
//! │  │  OUTOFSTOCK     │   │  3 Clothing     │                             │
//! │  └─────────────────┘   │  4 Electronics  │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! `id` is assigned by the backend. `0` means "not yet created": an
//! optimistic create keeps whatever id the caller supplied until the next
//! full catalog refresh brings the real one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

/// Backend-assigned product identity.
pub type ProductId = i64;

/// Id carried by a product that the backend has not created yet.
pub const UNSAVED_PRODUCT_ID: ProductId = 0;

// =============================================================================
// Inventory Status
// =============================================================================

/// Stock level as reported by the backend.
///
/// Displayed by views but never derived from `quantity` here: the backend is
/// the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum InventoryStatus {
    #[default]
    InStock,
    LowStock,
    OutOfStock,
}

impl InventoryStatus {
    /// All statuses in display order.
    pub const ALL: [InventoryStatus; 3] = [
        InventoryStatus::InStock,
        InventoryStatus::LowStock,
        InventoryStatus::OutOfStock,
    ];

    /// Wire representation (`INSTOCK`, `LOWSTOCK`, `OUTOFSTOCK`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::InStock => "INSTOCK",
            InventoryStatus::LowStock => "LOWSTOCK",
            InventoryStatus::OutOfStock => "OUTOFSTOCK",
        }
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InventoryStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "inventoryStatus".to_string(),
                value: s.to_string(),
                allowed: InventoryStatus::ALL
                    .iter()
                    .map(|status| status.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Category
// =============================================================================

/// The fixed category enumeration the backend's `categoryId` points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Accessories,
    Fitness,
    Clothing,
    Electronics,
}

impl Category {
    /// All categories in id order.
    pub const ALL: [Category; 4] = [
        Category::Accessories,
        Category::Fitness,
        Category::Clothing,
        Category::Electronics,
    ];

    /// Backend foreign key for this category.
    pub const fn id(&self) -> i64 {
        match self {
            Category::Accessories => 1,
            Category::Fitness => 2,
            Category::Clothing => 3,
            Category::Electronics => 4,
        }
    }

    /// Resolves a backend `categoryId`. Unknown ids yield `None`.
    pub fn from_id(id: i64) -> Option<Category> {
        Category::ALL.into_iter().find(|category| category.id() == id)
    }

    /// Human-readable label.
    pub const fn label(&self) -> &'static str {
        match self {
            Category::Accessories => "Accessories",
            Category::Fitness => "Fitness",
            Category::Clothing => "Clothing",
            Category::Electronics => "Electronics",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product in the client-visible catalog projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend identity; `0` until the backend has created it.
    #[serde(default)]
    pub id: ProductId,

    /// Business code, unique on the backend.
    pub code: String,

    /// Display name.
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Opaque internal reference, unique on the backend.
    #[serde(default)]
    pub internal_reference: String,

    /// Foreign key into [`Category`].
    #[serde(default = "default_category_id")]
    pub category_id: i64,

    /// Unit price.
    #[ts(type = "number")]
    pub price: Money,

    /// Available stock.
    #[serde(default)]
    pub quantity: i64,

    #[serde(default)]
    pub inventory_status: InventoryStatus,

    /// Average rating, 0 to 5.
    #[serde(default)]
    pub rating: f64,

    /// Shelf location.
    #[serde(default)]
    pub shell_id: i64,

    /// Resolved display handle. Never part of the backend payload.
    #[serde(skip)]
    pub image: Option<String>,

    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "number | null")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(type = "number | null")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_category_id() -> i64 {
    Category::Accessories.id()
}

impl Default for Product {
    /// An empty product, as used by "new product" forms.
    fn default() -> Self {
        Product {
            id: UNSAVED_PRODUCT_ID,
            code: String::new(),
            name: String::new(),
            description: String::new(),
            internal_reference: String::new(),
            category_id: default_category_id(),
            price: Money::zero(),
            quantity: 0,
            inventory_status: InventoryStatus::default(),
            rating: 0.0,
            shell_id: 0,
            image: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Product {
    /// True once the backend has assigned an id.
    #[inline]
    pub fn is_persisted(&self) -> bool {
        self.id > UNSAVED_PRODUCT_ID
    }

    /// Resolves `category_id` against the fixed enumeration.
    pub fn category(&self) -> Option<Category> {
        Category::from_id(self.category_id)
    }

    /// Whether there is any stock to put in a cart.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }

    /// Returns a copy carrying the given display handle URL.
    ///
    /// Views call this on their own copy; the catalog snapshot is never touched.
    pub fn with_image(&self, url: &str) -> Product {
        Product {
            image: Some(url.to_string()),
            ..self.clone()
        }
    }

    /// The mutable-field projection sent on create and update.
    pub fn fields(&self) -> ProductFields {
        ProductFields::from(self)
    }
}

// =============================================================================
// Product Fields
// =============================================================================

/// The fields a client may change: the PATCH body and the scalar part of the
/// multipart create form. Identity, timestamps, image and shelf are excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductFields {
    pub code: String,
    pub name: String,
    pub description: String,
    #[ts(type = "number")]
    pub price: Money,
    pub quantity: i64,
    pub internal_reference: String,
    pub inventory_status: InventoryStatus,
    pub rating: f64,
    pub category_id: i64,
}

impl From<&Product> for ProductFields {
    fn from(product: &Product) -> Self {
        ProductFields {
            code: product.code.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            quantity: product.quantity,
            internal_reference: product.internal_reference.clone(),
            inventory_status: product.inventory_status,
            rating: product.rating,
            category_id: product.category_id,
        }
    }
}

impl ProductFields {
    /// Form field name/value pairs in the order the backend lists them.
    pub fn form_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("code", self.code.clone()),
            ("name", self.name.clone()),
            ("description", self.description.clone()),
            ("price", self.price.to_decimal_string()),
            ("quantity", self.quantity.to_string()),
            ("internalReference", self.internal_reference.clone()),
            ("inventoryStatus", self.inventory_status.to_string()),
            ("rating", self.rating.to_string()),
            ("categoryId", self.category_id.to_string()),
        ]
    }
}

// =============================================================================
// Cart Line
// =============================================================================

/// A product together with how many units the visitor intends to buy.
///
/// Lines are unique by `product.id` and always carry `quantity ≥ 1`; the
/// [`Cart`](crate::cart::Cart) aggregate is the only thing that builds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
}

impl CartLine {
    pub(crate) fn new(product: Product, quantity: i64) -> Self {
        CartLine { product, quantity }
    }

    /// Identity used for merging.
    #[inline]
    pub fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&InventoryStatus::LowStock).unwrap(),
            "\"LOWSTOCK\""
        );
        let status: InventoryStatus = serde_json::from_str("\"OUTOFSTOCK\"").unwrap();
        assert_eq!(status, InventoryStatus::OutOfStock);
    }

    #[test]
    fn test_inventory_status_from_str() {
        assert_eq!("instock".parse::<InventoryStatus>(), Ok(InventoryStatus::InStock));
        assert!("SOLDOUT".parse::<InventoryStatus>().is_err());
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(Category::from_id(4), Some(Category::Electronics));
        assert_eq!(Category::from_id(99), None);
        assert_eq!(Category::Fitness.id(), 2);
    }

    #[test]
    fn test_product_decodes_backend_payload() {
        let json = r#"{
            "id": 1000,
            "code": "f230fh0g3",
            "name": "Bamboo Watch",
            "description": "Product Description",
            "image": "bamboo-watch.jpg",
            "categoryId": 1,
            "price": 65.0,
            "quantity": 24,
            "internalReference": "REF-123-456",
            "shellId": 15,
            "inventoryStatus": "INSTOCK",
            "rating": 5,
            "createdAt": 1718114215761,
            "updatedAt": 1718114215761
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, 1000);
        assert_eq!(product.price, Money::from_cents(6500));
        assert_eq!(product.category(), Some(Category::Accessories));
        assert_eq!(product.shell_id, 15);
        assert!(product.image.is_none());
        assert_eq!(
            product.created_at.map(|t| t.timestamp_millis()),
            Some(1718114215761)
        );
        assert!(product.is_persisted());
    }

    #[test]
    fn test_product_serialization_omits_image() {
        let product = Product {
            code: "C1".into(),
            name: "Cap".into(),
            ..Product::default()
        }
        .with_image("blob:storefront/abc");

        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("image").is_none());
        assert_eq!(json["internalReference"], "");
        assert!(!product.is_persisted());
    }

    #[test]
    fn test_fields_form_pairs() {
        let product = Product {
            code: "C1".into(),
            name: "Cap".into(),
            price: Money::from_cents(1250),
            quantity: 3,
            rating: 4.5,
            category_id: 3,
            inventory_status: InventoryStatus::LowStock,
            ..Product::default()
        };
        let pairs = product.fields().form_pairs();
        let names: Vec<&str> = pairs.iter().map(|(name, _)| *name).collect();

        assert_eq!(
            names,
            vec![
                "code",
                "name",
                "description",
                "price",
                "quantity",
                "internalReference",
                "inventoryStatus",
                "rating",
                "categoryId"
            ]
        );
        assert!(pairs.contains(&("price", "12.50".to_string())));
        assert!(pairs.contains(&("inventoryStatus", "LOWSTOCK".to_string())));
        assert!(pairs.contains(&("rating", "4.5".to_string())));
    }

    #[test]
    fn test_cart_line_total() {
        let product = Product {
            id: 1,
            price: Money::from_cents(999),
            ..Product::default()
        };
        let line = CartLine::new(product, 3);
        assert_eq!(line.line_total().cents(), 2997);
        assert_eq!(line.product_id(), 1);
    }
}
