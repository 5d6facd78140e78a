//! # Cart Aggregate
//!
//! The pure cart model: a list of [`CartLine`]s with merge semantics.
//!
//! ## Line State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │               add(p, n)                 add(p, n) / set_quantity(p, q>0)│
//! │   ┌────────┐ ──────────► ┌─────────────────────┐ ◄───────┐             │
//! │   │ absent │             │ present, quantity≥1 │ ────────┘             │
//! │   └────────┘ ◄────────── └─────────────────────┘                        │
//! │               remove(p)                                                 │
//! │                                                                         │
//! │  There is no "present with quantity 0" state. set_quantity(p, q≤0) is   │
//! │  a no-op: the caller maps "quantity became 0" onto remove(p).           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id (adding the same product accumulates)
//! - Every line has `quantity ≥ 1`
//! - `total()` and `total_units()` always fit in an `i64`; an add or a
//!   quantity change that would break this is rejected
//! - A failed operation leaves the cart untouched
//! - A line keeps the product snapshot from its first `add`; later adds of a
//!   newer copy only change the quantity

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartLine, Product, ProductId};
use crate::validation::validate_cart_quantity;

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds `quantity` units of a product.
    ///
    /// ## Behavior
    /// - Product already in cart: its quantity increases by `quantity`
    /// - Product not in cart: a new line is appended
    ///
    /// ## Errors
    /// - `quantity ≤ 0` → [`ValidationError::MustBePositive`](crate::ValidationError::MustBePositive)
    /// - Accumulated quantity overflows → [`CoreError::QuantityOverflow`]
    /// - Cart total or unit count overflows → [`CoreError::TotalOverflow`]
    pub fn add(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_cart_quantity(quantity)?;

        let (price, current) = match self.line(product.id) {
            Some(line) => (line.product.price, line.quantity),
            None => (product.price, 0),
        };
        let updated = current
            .checked_add(quantity)
            .ok_or(CoreError::QuantityOverflow {
                product_id: product.id,
                current,
                requested: quantity,
            })?;
        if self.totals_with(product.id, price, updated).is_none() {
            return Err(CoreError::TotalOverflow {
                product_id: product.id,
                quantity: updated,
            });
        }

        match self.line_mut(product.id) {
            Some(line) => line.quantity = updated,
            None => self.lines.push(CartLine::new(product.clone(), quantity)),
        }
        Ok(())
    }

    /// Overwrites the quantity of an existing line.
    ///
    /// Returns `true` if a line changed. A non-positive `quantity`, a
    /// product that is not in the cart, or a quantity whose total would
    /// overflow leaves everything as is and returns `false`; removal is
    /// always an explicit [`Cart::remove`].
    pub fn set_quantity(&mut self, product: &Product, quantity: i64) -> bool {
        if quantity <= 0 {
            return false;
        }
        let Some(price) = self.line(product.id).map(|line| line.product.price) else {
            return false;
        };
        if self.totals_with(product.id, price, quantity).is_none() {
            return false;
        }
        match self.line_mut(product.id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Removes the line for a product. Returns `false` if there was none.
    pub fn remove(&mut self, product: &Product) -> bool {
        self.remove_by_id(product.id)
    }

    /// Removes the line for a product id. Returns `false` if there was none.
    pub fn remove_by_id(&mut self, product_id: ProductId) -> bool {
        let initial_len = self.lines.len();
        self.lines.retain(|line| line.product_id() != product_id);
        self.lines.len() != initial_len
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The line for a product id, if present.
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id() == product_id)
    }

    /// Unit count and money total if the line for `product_id` held
    /// `quantity` units at `price`; `None` if either overflows.
    fn totals_with(&self, product_id: ProductId, price: Money, quantity: i64) -> Option<(i64, Money)> {
        let mut units = quantity;
        let mut total = price.checked_multiply_quantity(quantity)?;
        for line in self.lines.iter().filter(|line| line.product_id() != product_id) {
            units = units.checked_add(line.quantity)?;
            total = total.checked_add(line.line_total())?;
        }
        Some((units, total))
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id() == product_id)
    }

    /// All lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines (not units).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    pub fn total_units(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Sum of `price × quantity` over all lines, computed on every call.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    fn test_product(id: ProductId, price_cents: i64) -> Product {
        Product {
            id,
            code: format!("CODE-{}", id),
            name: format!("Product {}", id),
            price: Money::from_cents(price_cents),
            quantity: 10,
            ..Product::default()
        }
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = Cart::new();
        cart.add(&test_product(1, 999), 2).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total_units(), 2);
        assert_eq!(cart.total().cents(), 1998);
    }

    #[test]
    fn test_repeated_adds_accumulate_into_one_line() {
        let mut cart = Cart::new();
        let product = test_product(1, 100);

        for n in [1, 4, 2, 7] {
            cart.add(&product, n).unwrap();
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line(1).map(|l| l.quantity), Some(14));
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let err = cart.add(&test_product(1, 100), 0).unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_overflow_leaves_line_untouched() {
        let mut cart = Cart::new();
        let product = test_product(1, 1);
        cart.add(&product, i64::MAX).unwrap();

        let err = cart.add(&product, 1).unwrap_err();
        assert!(matches!(err, CoreError::QuantityOverflow { product_id: 1, .. }));
        assert_eq!(cart.line(1).map(|l| l.quantity), Some(i64::MAX));
    }

    #[test]
    fn test_add_rejects_line_total_overflow() {
        let mut cart = Cart::new();
        let product = test_product(1, 100);

        let err = cart.add(&product, i64::MAX / 10).unwrap_err();
        assert!(matches!(err, CoreError::TotalOverflow { product_id: 1, .. }));
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_add_rejects_cart_total_overflow() {
        let mut cart = Cart::new();
        let half = i64::MAX / 2 + 1;
        cart.add(&test_product(1, 1), half).unwrap();

        let err = cart.add(&test_product(2, 1), half).unwrap_err();
        assert!(matches!(err, CoreError::TotalOverflow { product_id: 2, .. }));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total().cents(), half);
    }

    #[test]
    fn test_add_rejects_unit_count_overflow() {
        let mut cart = Cart::new();
        let free = test_product(1, 0);
        cart.add(&free, i64::MAX).unwrap();

        let err = cart.add(&test_product(2, 0), 1).unwrap_err();
        assert!(matches!(err, CoreError::TotalOverflow { product_id: 2, .. }));
        assert_eq!(cart.total_units(), i64::MAX);
    }

    #[test]
    fn test_set_quantity_rejects_total_overflow() {
        let mut cart = Cart::new();
        let product = test_product(1, 100);
        cart.add(&product, 3).unwrap();

        assert!(!cart.set_quantity(&product, i64::MAX / 10));
        assert_eq!(cart.line(1).map(|l| l.quantity), Some(3));
        assert_eq!(cart.total().cents(), 300);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        let product = test_product(1, 100);
        cart.add(&product, 5).unwrap();

        assert!(cart.set_quantity(&product, 2));
        assert_eq!(cart.line(1).map(|l| l.quantity), Some(2));
    }

    #[test]
    fn test_set_quantity_zero_does_not_remove() {
        let mut cart = Cart::new();
        let product = test_product(1, 100);
        cart.add(&product, 5).unwrap();

        assert!(!cart.set_quantity(&product, 0));
        assert!(!cart.set_quantity(&product, -3));
        assert_eq!(cart.line(1).map(|l| l.quantity), Some(5));

        assert!(cart.remove(&product));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_on_absent_product_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity(&test_product(9, 100), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(&test_product(1, 100), 1).unwrap();
        let before = cart.clone();

        assert!(!cart.remove(&test_product(2, 100)));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_total_matches_line_sum() {
        let mut cart = Cart::new();
        cart.add(&test_product(1, 500), 2).unwrap();
        cart.add(&test_product(2, 999), 3).unwrap();

        assert_eq!(cart.total(), Money::from_cents(3997));
        assert_eq!(cart.total().to_string(), "$39.97");
    }

    #[test]
    fn test_line_keeps_first_product_snapshot() {
        let mut cart = Cart::new();
        let original = test_product(1, 100);
        let repriced = Product {
            price: Money::from_cents(250),
            ..original.clone()
        };

        cart.add(&original, 1).unwrap();
        cart.add(&repriced, 1).unwrap();

        assert_eq!(cart.total().cents(), 200);
    }

    #[test]
    fn test_serializes_lines_for_views() {
        let mut cart = Cart::new();
        cart.add(&test_product(1, 999), 2).unwrap();

        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(json["lines"][0]["quantity"], 2);
        assert_eq!(json["lines"][0]["product"]["id"], 1);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add(&test_product(1, 100), 1).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Money::zero());
    }
}
