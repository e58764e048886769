pub mod cart;
pub mod config;
