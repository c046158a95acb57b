//! Key-value persistence used to mirror the cart.
//!
//! The cart only needs a single string slot, but backends expose the whole
//! store so hosts can share one backend between several components.
//!
//! # Backends
//!
//! - [`MemoryPersistence`] - process-local map, for tests and embedded hosts
//! - [`FilePersistence`] - a single JSON object file on disk

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

mod file;
mod memory;

pub use file::FilePersistence;
pub use memory::MemoryPersistence;

/// Errors raised by persistence backends.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Underlying I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend could not encode its contents.
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The backing store exists but cannot be read as a key-value map.
    #[error("Corrupt store: {0}")]
    Corrupt(String),
}

/// Asynchronous string key-value storage.
///
/// Reads of a missing key return `Ok(None)`; they never fail because the key
/// is absent.
pub trait Persistence: Send + Sync {
    /// Read the value stored under `key`.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, PersistenceError>> + Send;

    /// Store `value` under `key`, replacing any existing value.
    fn set(&self, key: &str, value: &str)
    -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Delete `key`. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Delete every key in the backing store.
    fn clear(&self) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

impl<P: Persistence> Persistence for Arc<P> {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, PersistenceError>> + Send {
        (**self).get(key)
    }

    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        (**self).remove(key)
    }

    fn clear(&self) -> impl Future<Output = Result<(), PersistenceError>> + Send {
        (**self).clear()
    }
}
