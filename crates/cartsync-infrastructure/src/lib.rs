//! Adapters for the cart core: the persisted record codec, record stores,
//! the storefront HTTP gateway, path resolution, and configuration loading.

pub mod codec;
pub mod config_service;
pub mod dto;
pub mod gateway;
pub mod paths;
pub mod storage;

pub use crate::codec::DomainCart;
pub use crate::config_service::ConfigService;
pub use crate::dto::{PersistedCartRecord, PersistedLine};
pub use crate::gateway::StorefrontCartGateway;
pub use crate::paths::CartsyncPaths;
pub use crate::storage::{FileRecordStore, MemoryRecordStore};
