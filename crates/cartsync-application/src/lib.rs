//! Application layer for cartsync.
//!
//! Coordinates the cart core with its adapters: the [`CartStore`] runs the
//! cart state machine against a remote gateway, and [`CartPersistence`]
//! bridges committed state to the on-device record.

pub mod persistence;
pub mod store;

pub use persistence::{CartPersistence, HydratedCart};
pub use store::{AddToCartOptions, CartStore, CartTotals, StoreSettings};
