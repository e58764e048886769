use std::path::Path;

use anyhow::{Context, Result};
use cartsync_infrastructure::ConfigService;

pub fn print(config_path: Option<&Path>) -> Result<()> {
    let mut config = ConfigService::load(config_path).context("Failed to load configuration")?;
    if config.gateway.access_token.is_some() {
        config.gateway.access_token = Some("********".to_string());
    }

    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}
