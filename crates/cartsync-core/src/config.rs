//! Configuration model.
//!
//! Loaded from `config.toml` by the infrastructure `ConfigService`; every
//! field has a default so a partial (or missing) file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cart::{SizeEntry, SizeTable};

pub const DEFAULT_FREE_SHIPPING_THRESHOLD: f64 = 50.0;
pub const DEFAULT_CART_SOURCE: &str = "website";
pub const DEFAULT_STORAGE_KEY: &str = "cart";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CartConfig {
    /// Subtotal at which shipping becomes free.
    pub free_shipping_threshold: f64,
    /// Sent as the `source` cart attribute on creation.
    pub cart_source: String,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    /// Overrides the standard size table when non-empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<SizeEntry>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
            cart_source: DEFAULT_CART_SOURCE.to_string(),
            gateway: GatewayConfig::default(),
            storage: StorageConfig::default(),
            sizes: Vec::new(),
        }
    }
}

impl CartConfig {
    pub fn size_table(&self) -> SizeTable {
        SizeTable::from_entries(self.sizes.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// GraphQL endpoint of the storefront cart API.
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the record. Defaults to the platform data dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Record key; the file is `<dir>/<key>.json`.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}
