//! Remote cart gateway port.
//!
//! The commerce backend is reached through four operations. Each returns the
//! full authoritative cart snapshot on success, or one of the gateway error
//! variants of [`CartError`](crate::error::CartError): `Transport`,
//! `RemoteValidation`, `EmptyResult`.

mod model;

pub use model::{CartAttribute, CartLineInput, RemoteCart, RemoteLine, UserError};

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Creates a cart with every line of one purchase decision in a single request.
    ///
    /// Called at most once per session, while no cart id is known.
    async fn create_cart(
        &self,
        lines: &[CartLineInput],
        attributes: &[CartAttribute],
    ) -> Result<RemoteCart>;

    /// Appends lines to an existing cart.
    ///
    /// The remote side may merge an added line into an existing identical
    /// line, so the returned lines do not map 1:1 to the requested ones.
    async fn add_lines(&self, cart_id: &str, lines: &[CartLineInput]) -> Result<RemoteCart>;

    /// Sets the same quantity on every line in `line_ids` in one call.
    async fn update_line_quantities(
        &self,
        cart_id: &str,
        line_ids: &[String],
        quantity: u32,
    ) -> Result<RemoteCart>;

    /// Removes every line in `line_ids` in one call.
    async fn remove_lines(&self, cart_id: &str, line_ids: &[String]) -> Result<RemoteCart>;
}
