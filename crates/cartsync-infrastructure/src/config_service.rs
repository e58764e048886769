//! Configuration loading.
//!
//! Precedence: environment variables > config.toml > defaults.

use std::fs;
use std::path::{Path, PathBuf};

use cartsync_core::config::CartConfig;
use cartsync_core::error::{CartError, Result};

use crate::paths::CartsyncPaths;

pub const ENV_ENDPOINT: &str = "CARTSYNC_ENDPOINT";
pub const ENV_ACCESS_TOKEN: &str = "CARTSYNC_ACCESS_TOKEN";
pub const ENV_STORAGE_DIR: &str = "CARTSYNC_STORAGE_DIR";

pub struct ConfigService;

impl ConfigService {
    /// Loads from `path`, or from `~/.config/cartsync/config.toml` when `None`,
    /// then applies environment overrides.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<CartConfig> {
        let path: PathBuf = match path {
            Some(p) => p.to_path_buf(),
            None => CartsyncPaths::config_file().map_err(|e| CartError::config(e.to_string()))?,
        };

        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)?;
            Self::parse(&content).map_err(|e| {
                CartError::config(format!("{}: {}", path.display(), e))
            })?
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            CartConfig::default()
        };

        Self::apply_env(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<CartConfig> {
        Ok(toml::from_str(content)?)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_env<F>(config: &mut CartConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            config.gateway.endpoint = endpoint;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|v| !v.is_empty()) {
            config.gateway.access_token = Some(token);
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR).filter(|v| !v.is_empty()) {
            config.storage.dir = Some(PathBuf::from(dir));
        }
    }
}
