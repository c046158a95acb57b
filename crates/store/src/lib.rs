//! Pocket Cart Store - the cart state container.
//!
//! [`CartStore`] holds the ordered list of cart line items, applies the
//! add / increment / decrement operations, and mirrors the list to a
//! [`Persistence`] backend after every change.
//!
//! # Modules
//!
//! - [`store`] - The cart store and its change reports
//! - [`persistence`] - Key-value storage trait with memory and file backends
//! - [`scope`] - Once-settable slot for handing a store to call sites
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod persistence;
pub mod scope;
pub mod store;

pub use config::{CartConfig, ConfigError, CorruptStatePolicy};
pub use error::{CartError, Result};
pub use persistence::{FilePersistence, MemoryPersistence, Persistence, PersistenceError};
pub use scope::CartScope;
pub use store::{CartChange, CartStore, DEFAULT_STORAGE_KEY};
