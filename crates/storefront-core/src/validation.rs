//! # Validation Module
//!
//! Field rules for products and cart quantities.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: View forms (outside this workspace)                           │
//! │  ├── Required fields, immediate user feedback                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Cart quantities (every Cart::add)                                  │
//! │  └── Catalog datasets read from disk (fallback override files)         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                       │
//! │  ├── Unique code / internal reference                                   │
//! │  └── Category foreign key                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products coming from the live backend are taken as truth and are not
//! re-validated here.
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_cart_quantity, validate_rating};
//!
//! assert!(validate_cart_quantity(2).is_ok());
//! assert!(validate_cart_quantity(0).is_err());
//! assert!(validate_rating(4.5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a product code.
pub const MAX_CODE_LEN: usize = 50;

/// Maximum length of a product name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a product description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Highest allowed rating.
pub const MAX_RATING: f64 = 5.0;

// =============================================================================
// String Validators
// =============================================================================

fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product code: non-empty, at most 50 characters.
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    validate_required("code", code, MAX_CODE_LEN)
}

/// Validates a product name: non-empty, at most 200 characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name, MAX_NAME_LEN)
}

/// Validates a description: may be empty, at most 500 characters.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price (non-negative).
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates available stock (non-negative).
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a quantity being put into a cart (strictly positive).
pub fn validate_cart_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a rating in `0..=5`.
pub fn validate_rating(rating: f64) -> ValidationResult<()> {
    if !rating.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "rating".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: 0,
            max: MAX_RATING as i64,
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every client-checkable field of a product.
///
/// Stops at the first failure.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_code(&product.code)?;
    validate_product_name(&product.name)?;
    validate_description(&product.description)?;
    validate_price(product.price)?;
    validate_stock_quantity(product.quantity)?;
    validate_rating(product.rating)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_product() -> Product {
        Product {
            id: 1,
            code: "f230fh0g3".into(),
            name: "Bamboo Watch".into(),
            description: "Product Description".into(),
            price: Money::from_cents(6500),
            quantity: 24,
            rating: 5.0,
            ..Product::default()
        }
    }

    #[test]
    fn test_validate_code_and_name() {
        assert!(validate_product_code("COKE-330").is_ok());
        assert!(validate_product_code("   ").is_err());
        assert!(validate_product_code(&"A".repeat(51)).is_err());
        assert!(validate_product_name("Coca-Cola 330ml").is_ok());
        assert!(validate_product_name("").is_err());
    }

    #[test]
    fn test_validate_description_length() {
        assert!(validate_description("").is_ok());
        assert!(validate_description(&"x".repeat(500)).is_ok());
        assert!(validate_description(&"x".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_numbers() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_cents(-1)).is_err());
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
        assert!(validate_cart_quantity(1).is_ok());
        assert!(validate_cart_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_rating() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(matches!(
            validate_rating(5.5),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            validate_rating(f64::NAN),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&valid_product()).is_ok());

        let negative_stock = Product {
            quantity: -2,
            ..valid_product()
        };
        assert_eq!(
            validate_product(&negative_stock),
            Err(ValidationError::MustNotBeNegative {
                field: "quantity".to_string()
            })
        );
    }
}
