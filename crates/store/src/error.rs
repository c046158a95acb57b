//! Cart error type.

use thiserror::Error;

use crate::persistence::PersistenceError;

/// Errors returned by [`CartStore`](crate::CartStore) and
/// [`CartScope`](crate::CartScope).
#[derive(Debug, Error)]
pub enum CartError {
    /// The persistence backend failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// The cart could not be serialized for storage.
    #[error("Failed to serialize cart: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The stored cart could not be parsed and the store is configured to
    /// fail rather than reset.
    #[error("Stored cart is corrupt: {0}")]
    CorruptState(#[source] serde_json::Error),

    /// The cart was requested from a scope nothing has been provided to.
    #[error("cart accessed before it was provided")]
    NotProvided,

    /// A second store was provided to a scope that already holds one.
    #[error("cart was already provided")]
    AlreadyProvided,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_display() {
        assert_eq!(
            CartError::NotProvided.to_string(),
            "cart accessed before it was provided"
        );

        let err = CartError::from(PersistenceError::Corrupt("cart.json".to_string()));
        assert_eq!(err.to_string(), "Persistence error: Corrupt store: cart.json");
    }
}
