mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./tidepool.toml",
        "~/.config/tidepool/config.toml",
        "/etc/tidepool/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    let mut config = Config::default();
    apply_env_overrides(&mut config);
    validate_config(&config)?;
    Ok(config)
}

/// Overlay values from the process environment (and `.env`, once loaded).
///
/// Recognized: `PEXELS_API_KEY`, `PORT`, `TIDEPOOL_STORAGE_BUCKET`,
/// `TIDEPOOL_PUBLIC_BASE_URL`.
pub fn apply_env_overrides(config: &mut Config) {
    if let Some(key) = env_value("PEXELS_API_KEY") {
        config.provider.api_key = key;
    }

    if let Some(port) = env_value("PORT") {
        match port.parse::<u16>() {
            Ok(port) => config.server.port = port,
            Err(_) => tracing::warn!("Ignoring non-numeric PORT value: {:?}", port),
        }
    }

    if let Some(bucket) = env_value("TIDEPOOL_STORAGE_BUCKET") {
        config.storage.bucket = Some(bucket);
    }

    if let Some(url) = env_value("TIDEPOOL_PUBLIC_BASE_URL") {
        config.storage.public_base_url = Some(url);
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if !(0.0..=1.0).contains(&config.search.threshold) {
        anyhow::bail!(
            "Search threshold must be between 0.0 and 1.0, got {}",
            config.search.threshold
        );
    }

    if config.search.fallback_term.trim().is_empty() {
        anyhow::bail!("Search fallback_term cannot be empty");
    }

    if config.storage.timeout_secs == 0 {
        anyhow::bail!("Storage timeout_secs cannot be 0");
    }

    if config.provider.timeout_secs == 0 {
        anyhow::bail!("Provider timeout_secs cannot be 0");
    }

    if config.provider.requests_per_second == 0 {
        anyhow::bail!("Provider requests_per_second cannot be 0");
    }

    match config.storage.backend {
        StorageBackend::S3 => {
            if config.storage.bucket.as_deref().unwrap_or_default().is_empty() {
                anyhow::bail!("Storage backend 's3' requires a bucket");
            }
        }
        StorageBackend::Local => {
            if !config.storage.root.exists() {
                tracing::warn!("Storage root does not exist: {:?}", config.storage.root);
            }
        }
        StorageBackend::Memory => {}
    }

    if config.provider.api_key.is_empty() {
        tracing::warn!("No provider API key configured; fallback requests will be rejected");
    }

    Ok(())
}
