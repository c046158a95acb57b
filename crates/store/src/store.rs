//! The cart store.
//!
//! [`CartStore`] owns the list of line items. Mutations take a single lock,
//! change the list, publish it to subscribers and write it to persistence
//! before releasing the lock. The written value is therefore always the
//! state the mutation produced, and writes land in the order mutations were
//! applied.
//!
//! Ordering: a new product is appended; incrementing or decrementing an item
//! moves it to the front. Everything else keeps its relative position.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use pocket_cart_core::{LineItem, NewLineItem};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::config::{CartConfig, CorruptStatePolicy};
use crate::error::{CartError, Result};
use crate::persistence::{Persistence, PersistenceError};

/// Key the cart is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "products";

/// Outcome of a single cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new product was appended with quantity 1.
    Added,
    /// An existing item went up by one and moved to the front.
    Incremented { quantity: u32 },
    /// An existing item went down by one and moved to the front.
    Decremented { quantity: u32 },
    /// An item reached zero and was removed.
    Removed,
    /// No item with the requested ID; nothing changed or was written.
    NotFound,
}

impl CartChange {
    /// Whether the operation changed the cart.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

/// Shopping cart mirrored to a [`Persistence`] backend.
///
/// Share it between tasks with an `Arc`; all methods take `&self`.
pub struct CartStore<P> {
    persistence: P,
    key: String,
    on_corrupt: CorruptStatePolicy,
    products: Mutex<Vec<LineItem>>,
    published: watch::Sender<Arc<[LineItem]>>,
}

impl<P> fmt::Debug for CartStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("on_corrupt", &self.on_corrupt)
            .field("items", &self.published.borrow().len())
            .finish_non_exhaustive()
    }
}

impl<P: Persistence> CartStore<P> {
    /// Create an empty store with the default key and corrupt-state policy.
    ///
    /// Nothing is read from `persistence` until [`load`](Self::load).
    #[must_use]
    pub fn new(persistence: P) -> Self {
        let (published, _) = watch::channel(Arc::from(Vec::new()));
        Self {
            persistence,
            key: DEFAULT_STORAGE_KEY.to_string(),
            on_corrupt: CorruptStatePolicy::default(),
            products: Mutex::new(Vec::new()),
            published,
        }
    }

    /// Create an empty store using the key and policy from `config`.
    #[must_use]
    pub fn from_config(persistence: P, config: &CartConfig) -> Self {
        Self::new(persistence)
            .with_key(config.storage_key.clone())
            .with_corrupt_policy(config.on_corrupt)
    }

    /// Create a store from `config` and load the stored cart.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub async fn open(persistence: P, config: &CartConfig) -> Result<Self> {
        let store = Self::from_config(persistence, config);
        store.load().await?;
        Ok(store)
    }

    /// Use `key` as the storage key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Set the policy for an unreadable stored cart.
    #[must_use]
    pub fn with_corrupt_policy(mut self, policy: CorruptStatePolicy) -> Self {
        self.on_corrupt = policy;
        self
    }

    /// The storage key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The persistence backend.
    #[must_use]
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Replace the in-memory cart with the stored one.
    ///
    /// A missing key leaves the cart as it is. Stored entries that are not
    /// valid line items, have quantity 0, or repeat an earlier ID are dropped
    /// one by one with a warning; the rest are kept. Returns the number of
    /// items held afterwards.
    ///
    /// Under [`CorruptStatePolicy::Reset`] a stored value that is not a JSON
    /// array, or a backing store that reports itself corrupt, yields an empty
    /// cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Persistence` if the backend read fails, and
    /// `CartError::CorruptState` if the stored value is not a JSON array
    /// and the policy is [`CorruptStatePolicy::Fail`].
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize> {
        let mut products = self.products.lock().await;

        let stored = match self.persistence.get(&self.key).await {
            Ok(stored) => stored,
            Err(PersistenceError::Corrupt(reason))
                if self.on_corrupt == CorruptStatePolicy::Reset =>
            {
                warn!(key = %self.key, %reason, "Backing store is corrupt, starting empty");
                *products = Vec::new();
                self.publish(&products);
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let Some(raw) = stored else {
            debug!(key = %self.key, "No stored cart");
            return Ok(products.len());
        };

        let loaded = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => sanitize(entries),
            Err(e) => match self.on_corrupt {
                CorruptStatePolicy::Reset => {
                    warn!(key = %self.key, error = %e, "Stored cart is corrupt, starting empty");
                    Vec::new()
                }
                CorruptStatePolicy::Fail => return Err(CartError::CorruptState(e)),
            },
        };

        *products = loaded;
        self.publish(&products);
        info!(items = products.len(), "Cart loaded");
        Ok(products.len())
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented instead, exactly as
    /// [`increment`](Self::increment) would.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written. The in-memory change
    /// is kept.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add_to_cart(&self, item: NewLineItem) -> Result<CartChange> {
        let mut products = self.products.lock().await;

        let change = match position(&products, item.id.as_str()) {
            Some(pos) => CartChange::Incremented {
                quantity: increment_at(&mut products, pos),
            },
            None => {
                products.push(item.into_line_item());
                CartChange::Added
            }
        };

        self.commit(&products).await?;
        debug!(?change, "Cart updated");
        Ok(change)
    }

    /// Increase an item's quantity by one and move it to the front.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    #[instrument(skip(self))]
    pub async fn increment(&self, id: &str) -> Result<CartChange> {
        let mut products = self.products.lock().await;

        let Some(pos) = position(&products, id) else {
            debug!("Increment of unknown product ignored");
            return Ok(CartChange::NotFound);
        };
        let change = CartChange::Incremented {
            quantity: increment_at(&mut products, pos),
        };

        self.commit(&products).await?;
        debug!(?change, "Cart updated");
        Ok(change)
    }

    /// Decrease an item's quantity by one.
    ///
    /// An item that reaches zero is removed; otherwise it moves to the front.
    /// Emptying the cart this way persists the empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    #[instrument(skip(self))]
    pub async fn decrement(&self, id: &str) -> Result<CartChange> {
        let mut products = self.products.lock().await;

        let Some(pos) = position(&products, id) else {
            debug!("Decrement of unknown product ignored");
            return Ok(CartChange::NotFound);
        };
        let change = decrement_at(&mut products, pos);

        self.commit(&products).await?;
        debug!(?change, "Cart updated");
        Ok(change)
    }

    /// Empty the cart and delete its stored key. Other keys are untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Result<()> {
        let mut products = self.products.lock().await;
        products.clear();
        self.publish(&products);
        self.persistence.remove(&self.key).await?;
        info!("Cart cleared");
        Ok(())
    }

    async fn commit(&self, products: &[LineItem]) -> Result<()> {
        self.publish(products);
        let value = serde_json::to_string(products).map_err(CartError::Serialize)?;
        self.persistence.set(&self.key, &value).await?;
        Ok(())
    }
}

impl<P> CartStore<P> {
    /// Snapshot of the current line items, front first.
    #[must_use]
    pub fn products(&self) -> Arc<[LineItem]> {
        self.published.borrow().clone()
    }

    /// The line item for `id`, if present.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<LineItem> {
        self.published
            .borrow()
            .iter()
            .find(|item| item.id.as_str() == id)
            .cloned()
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.published
            .borrow()
            .iter()
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.published.borrow().len()
    }

    /// Whether the cart holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.published.borrow().is_empty()
    }

    /// Receive every committed version of the cart.
    ///
    /// The receiver starts out holding the current items.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<[LineItem]>> {
        self.published.subscribe()
    }

    fn publish(&self, products: &[LineItem]) {
        self.published.send_replace(Arc::from(products));
    }
}

fn position(products: &[LineItem], id: &str) -> Option<usize> {
    products.iter().position(|item| item.id.as_str() == id)
}

fn increment_at(products: &mut Vec<LineItem>, pos: usize) -> u32 {
    let mut item = products.remove(pos);
    item.quantity = item.quantity.saturating_add(1);
    let quantity = item.quantity;
    products.insert(0, item);
    quantity
}

fn decrement_at(products: &mut Vec<LineItem>, pos: usize) -> CartChange {
    let mut item = products.remove(pos);
    item.quantity = item.quantity.saturating_sub(1);
    if item.quantity == 0 {
        return CartChange::Removed;
    }
    let quantity = item.quantity;
    products.insert(0, item);
    CartChange::Decremented { quantity }
}

/// Keep the stored entries that parse as line items and respect the
/// one-per-ID, quantity >= 1 rules.
fn sanitize(entries: Vec<serde_json::Value>) -> Vec<LineItem> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let item = match serde_json::from_value::<LineItem>(entry) {
                Ok(item) => item,
                Err(e) => {
                    warn!(index, error = %e, "Dropping unreadable stored item");
                    return None;
                }
            };
            if item.quantity == 0 {
                warn!(product_id = %item.id, "Dropping stored item with zero quantity");
                return None;
            }
            if !seen.insert(item.id.clone()) {
                warn!(product_id = %item.id, "Dropping duplicate stored item");
                return None;
            }
            Some(item)
        })
        .collect()
}
