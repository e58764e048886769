//! Path resolution for cartsync configuration and data files.
//!
//! ```text
//! ~/.config/cartsync/          # Config directory
//! └── config.toml              # Gateway, storage, and pricing settings
//!
//! ~/.local/share/cartsync/     # Data directory
//! └── cart.json                # On-device cart record (key "cart")
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "cartsync";
const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform directory could not be determined.
    DirNotFound(&'static str),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::DirNotFound(kind) => write!(f, "Cannot find {} directory", kind),
        }
    }
}

impl std::error::Error for PathError {}

pub struct CartsyncPaths;

impl CartsyncPaths {
    /// e.g. `~/.config/cartsync/`
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("config"))
    }

    /// e.g. `~/.local/share/cartsync/`
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::DirNotFound("data"))
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}
