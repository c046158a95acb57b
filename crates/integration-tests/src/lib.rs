//! Integration tests for Pocket Cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pocket-cart-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Operation semantics across the public store API
//! - `cart_persistence` - Reload behavior against memory and file backends
//! - `cart_concurrency` - Interleaved operations against a slow backend
//!
//! This library holds the fixtures shared by those test files.

use std::time::Duration;

use pocket_cart_core::{LineItem, NewLineItem, Price, ProductId};
use pocket_cart_store::{Persistence, PersistenceError};

/// Build a product to add, priced at 10.00.
///
/// # Panics
///
/// Panics if `id` is empty.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn product(id: &str) -> NewLineItem {
    NewLineItem::new(
        ProductId::parse(id).unwrap(),
        format!("Product {id}"),
        format!("https://img.example/{id}.png"),
        Price::from_cents(1000),
    )
}

/// IDs of `products` in order.
#[must_use]
pub fn ids(products: &[LineItem]) -> Vec<&str> {
    products.iter().map(|p| p.id.as_str()).collect()
}

/// Wraps a backend and delays every write, widening the window in which a
/// second operation could overtake the first.
#[derive(Debug, Clone)]
pub struct SlowPersistence<P> {
    inner: P,
    delay: Duration,
}

impl<P> SlowPersistence<P> {
    /// Delay writes to `inner` by `delay`.
    #[must_use]
    pub const fn new(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

impl<P: Persistence> Persistence for SlowPersistence<P> {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        tokio::time::sleep(self.delay).await;
        self.inner.remove(key).await
    }

    async fn clear(&self) -> Result<(), PersistenceError> {
        self.inner.clear().await
    }
}
