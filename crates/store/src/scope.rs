//! Provisioning slot for a shared cart.
//!
//! Hosts that build the store at startup and hand it to components later can
//! park it in a [`CartScope`]. Asking the scope for the cart before it has
//! been provided is a wiring mistake and fails with
//! [`CartError::NotProvided`].

use std::sync::{Arc, OnceLock};

use crate::error::{CartError, Result};
use crate::store::CartStore;

/// Once-settable holder of a shared [`CartStore`].
#[derive(Debug)]
pub struct CartScope<P> {
    slot: OnceLock<Arc<CartStore<P>>>,
}

impl<P> Default for CartScope<P> {
    fn default() -> Self {
        Self {
            slot: OnceLock::new(),
        }
    }
}

impl<P> CartScope<P> {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the store. A scope accepts exactly one store.
    ///
    /// # Errors
    ///
    /// Returns `CartError::AlreadyProvided` if a store is already installed.
    pub fn provide(&self, store: Arc<CartStore<P>>) -> Result<()> {
        self.slot
            .set(store)
            .map_err(|_| CartError::AlreadyProvided)
    }

    /// The provided store.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotProvided` if [`provide`](Self::provide) has not
    /// been called.
    pub fn cart(&self) -> Result<&Arc<CartStore<P>>> {
        self.slot.get().ok_or(CartError::NotProvided)
    }

    /// Whether a store has been provided.
    #[must_use]
    pub fn is_provided(&self) -> bool {
        self.slot.get().is_some()
    }
}
