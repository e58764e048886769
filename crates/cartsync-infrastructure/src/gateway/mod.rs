//! Remote cart gateway adapters.

mod documents;
mod storefront;
mod wire;

pub use storefront::StorefrontCartGateway;
