//! Cart synchronization core.
//!
//! Owns the shopping-cart domain model, the pure reducer that commits state
//! transitions, the line grouping algorithm that reconciles a remote cart
//! snapshot against local items, and the ports (`CartGateway`,
//! `CartRecordStore`) that adapters implement.

pub mod cart;
pub mod config;
pub mod error;
pub mod gateway;
pub mod grouping;
pub mod storage;

// Re-export common error type
pub use error::{CartError, Result};

pub use cart::{
    CartAction, CartItem, CartState, ItemDetails, OrderType, RequestStatus, SizeEntry, SizeTable,
};
pub use gateway::{CartAttribute, CartGateway, CartLineInput, RemoteCart, RemoteLine, UserError};
pub use storage::CartRecordStore;
