//! Pocket Cart Core - Shared types library.
//!
//! This crate provides the cart types used across all Pocket Cart components:
//! - `store` - The cart store and its persistence backends
//! - `cli` - Command-line host for a file-backed cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no async
//! runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, prices and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
