mod types;

pub use types::*;

use crate::Result;
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable that replaces `service.base_url` from the file.
pub const BASE_URL_ENV: &str = "SKINSCAN_BASE_URL";

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(config_path).await
}

pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    let config = apply_overrides(config, env::var(BASE_URL_ENV).ok());
    config.validate()?;

    Ok(config)
}

pub fn apply_overrides(mut config: Config, base_url_override: Option<String>) -> Config {
    if let Some(base_url) = base_url_override.filter(|url| !url.trim().is_empty()) {
        info!("Overriding service base URL from {}", BASE_URL_ENV);
        config.service.base_url = base_url;
    }
    config
}
