//! # Cart Aggregation Engine
//!
//! Wraps the pure [`Cart`] aggregate and publishes a snapshot of its lines
//! after every operation. Never talks to the backend.
//!
//! `set_quantity` with a non-positive quantity is a no-op: the caller that
//! maps "quantity became 0" onto removal must call [`CartEngine::remove`].

use std::sync::{Arc, Mutex, MutexGuard};

use storefront_core::{Cart, CartLine, CoreResult, Money, Product, ProductId};
use tracing::debug;

use crate::subject::{SnapshotSubject, Subscription};

/// The cart engine.
#[derive(Debug)]
pub struct CartEngine {
    cart: Mutex<Cart>,
    snapshots: SnapshotSubject<Vec<CartLine>>,
}

impl CartEngine {
    /// Creates an empty cart.
    pub fn new() -> Self {
        CartEngine {
            cart: Mutex::new(Cart::new()),
            snapshots: SnapshotSubject::new(Vec::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `op` on the cart and publishes the resulting lines while still
    /// holding the lock, so snapshots go out in mutation order.
    fn mutate<R>(&self, op: impl FnOnce(&mut Cart) -> R) -> R {
        let mut cart = self.lock();
        let result = op(&mut cart);
        self.snapshots.publish(cart.lines().to_vec());
        result
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Adds `quantity` units; an existing line accumulates.
    ///
    /// A rejected add (non-positive quantity, quantity or total overflow)
    /// leaves the cart as it was and publishes nothing.
    pub fn add(&self, product: &Product, quantity: i64) -> CoreResult<()> {
        let mut cart = self.lock();
        cart.add(product, quantity)?;
        self.snapshots.publish(cart.lines().to_vec());

        debug!(product_id = product.id, quantity, lines = cart.len(), "Added to cart");
        Ok(())
    }

    /// Adds a single unit.
    pub fn add_one(&self, product: &Product) -> CoreResult<()> {
        self.add(product, 1)
    }

    /// Overwrites the quantity of an existing line. Returns `false` when
    /// nothing changed (absent product, `quantity ≤ 0`, or a total that
    /// would overflow).
    pub fn set_quantity(&self, product: &Product, quantity: i64) -> bool {
        let changed = self.mutate(|cart| cart.set_quantity(product, quantity));
        if !changed && quantity <= 0 {
            debug!(product_id = product.id, quantity, "Non-positive quantity ignored; caller removes the line");
        }
        changed
    }

    /// Removes a product's line. Removing an absent product is a no-op.
    pub fn remove(&self, product: &Product) -> bool {
        self.remove_by_id(product.id)
    }

    pub fn remove_by_id(&self, product_id: ProductId) -> bool {
        let removed = self.mutate(|cart| cart.remove_by_id(product_id));
        debug!(product_id, removed, "Removed from cart");
        removed
    }

    /// Empties the cart.
    pub fn clear(&self) {
        self.mutate(Cart::clear);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Subscribes to cart snapshots.
    pub fn cart(&self) -> Subscription<Vec<CartLine>> {
        self.snapshots.subscribe()
    }

    /// The current lines.
    pub fn snapshot(&self) -> Arc<Vec<CartLine>> {
        self.snapshots.current()
    }

    /// The line for a product id, if present.
    pub fn line(&self, product_id: ProductId) -> Option<CartLine> {
        self.lock().line(product_id).cloned()
    }

    /// Number of distinct lines.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Number of units across all lines.
    pub fn total_units(&self) -> i64 {
        self.lock().total_units()
    }

    /// Sum of `price × quantity`, computed on every call.
    pub fn total(&self) -> Money {
        self.lock().total()
    }
}

impl Default for CartEngine {
    fn default() -> Self {
        CartEngine::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{CoreError, ValidationError};

    fn product(id: ProductId, price_cents: i64) -> Product {
        Product {
            id,
            code: format!("P-{}", id),
            name: format!("Product {}", id),
            price: Money::from_cents(price_cents),
            quantity: 50,
            ..Product::default()
        }
    }

    #[tokio::test]
    async fn test_repeated_adds_merge_into_one_line() {
        let engine = CartEngine::default();
        let watch = product(1, 6500);

        for n in [2, 3, 5] {
            engine.add(&watch, n).unwrap();
        }

        assert_eq!(engine.count(), 1);
        assert_eq!(engine.line(1).map(|l| l.quantity), Some(10));
        assert_eq!(engine.total_units(), 10);
    }

    #[tokio::test]
    async fn test_total_of_two_lines() {
        let engine = CartEngine::default();
        engine.add(&product(1, 500), 2).unwrap();
        engine.add(&product(2, 999), 3).unwrap();

        assert_eq!(engine.total(), Money::from_cents(3997));
        assert_eq!(engine.total().to_decimal_string(), "39.97");
        assert_eq!(engine.count(), 2);
    }

    #[tokio::test]
    async fn test_remove_absent_product_keeps_snapshot() {
        let engine = CartEngine::default();
        engine.add(&product(1, 100), 1).unwrap();
        let mut sub = engine.cart();
        let before = sub.next().await.unwrap();

        assert!(!engine.remove(&product(2, 100)));

        let after = sub.next().await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_set_quantity_zero_keeps_line_until_removed() {
        let engine = CartEngine::default();
        let mat = product(3, 2000);
        engine.add(&mat, 4).unwrap();

        assert!(!engine.set_quantity(&mat, 0));
        assert_eq!(engine.line(3).map(|l| l.quantity), Some(4));

        assert!(engine.remove(&mat));
        assert_eq!(engine.count(), 0);
        assert!(engine.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_overwrites() {
        let engine = CartEngine::default();
        let mat = product(3, 2000);
        engine.add(&mat, 4).unwrap();

        assert!(engine.set_quantity(&mat, 1));
        assert_eq!(engine.total(), Money::from_cents(2000));
    }

    #[tokio::test]
    async fn test_rejected_add_publishes_nothing() {
        let engine = CartEngine::default();
        let mut sub = engine.cart();
        sub.next().await.unwrap();

        let err = engine.add(&product(1, 100), 0).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::MustBePositive { .. })
        ));

        engine.add_one(&product(1, 100)).unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_overflowing_add_is_rejected_and_total_stays_defined() {
        let engine = CartEngine::default();
        let mut sub = engine.cart();
        sub.next().await.unwrap();

        let err = engine.add(&product(1, 100), i64::MAX / 10).unwrap_err();
        assert!(matches!(err, CoreError::TotalOverflow { product_id: 1, .. }));
        assert_eq!(engine.total(), Money::zero());
        assert_eq!(engine.total_units(), 0);

        engine.add(&product(2, 100), 1).unwrap();
        assert_eq!(sub.next().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unread_subscriber_receives_every_snapshot() {
        let engine = CartEngine::default();
        let mut sub = engine.cart();
        let watch = product(1, 6500);

        for _ in 0..100 {
            engine.add(&watch, 1).unwrap();
        }

        assert!(sub.next().await.unwrap().is_empty());
        for expected in 1..=100 {
            let lines = sub.next().await.unwrap();
            assert_eq!(lines[0].quantity, expected);
        }
    }

    #[tokio::test]
    async fn test_snapshots_published_in_order() {
        let engine = CartEngine::default();
        let mut sub = engine.cart();
        let a = product(1, 100);
        let b = product(2, 200);

        engine.add(&a, 1).unwrap();
        engine.add(&b, 1).unwrap();
        engine.set_quantity(&a, 5);
        engine.clear();

        let mut seen = Vec::new();
        for _ in 0..5 {
            let lines = sub.next().await.unwrap();
            seen.push(lines.iter().map(|l| (l.product_id(), l.quantity)).collect::<Vec<_>>());
        }

        assert_eq!(
            seen,
            vec![
                vec![],
                vec![(1, 1)],
                vec![(1, 1), (2, 1)],
                vec![(1, 5), (2, 1)],
                vec![],
            ]
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_not_aliased() {
        let engine = CartEngine::default();
        engine.add(&product(1, 100), 1).unwrap();
        let held = engine.snapshot();

        engine.add(&product(1, 100), 1).unwrap();

        assert_eq!(held[0].quantity, 1);
        assert_eq!(engine.snapshot()[0].quantity, 2);
    }
}
