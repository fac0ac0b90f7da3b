use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Context;

use breeasy_common::ProxyConfig;

const DEFAULT_CONFIG_PATH: &str = "./.breeasy/proxy.json";

pub struct LoadedConfig {
    pub config: ProxyConfig,
    pub path: PathBuf,
    /// Set when the file existed but could not be used; reported once logging
    /// is up.
    pub fallback_reason: Option<anyhow::Error>,
}

pub async fn load() -> LoadedConfig {
    let path = std::env::var("BREEASY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let (mut config, fallback_reason) = match read_config(&path).await {
        Ok(config) => (config, None),
        Err(err) => (ProxyConfig::default(), Some(err)),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config.sanitize();

    LoadedConfig {
        config,
        path,
        fallback_reason,
    }
}

async fn read_config(path: &Path) -> anyhow::Result<ProxyConfig> {
    match tokio::fs::read(path).await {
        Ok(raw) => serde_json::from_slice::<ProxyConfig>(&raw)
            .with_context(|| format!("invalid config file {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(ProxyConfig::default()),
        Err(err) => {
            Err(err).with_context(|| format!("failed to read config file {}", path.display()))
        }
    }
}

fn apply_env_overrides(config: &mut ProxyConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(base_url) = var("BREEASY_API_BASE") {
        config.status_store.base_url = base_url;
    }
    if let Some(port) = var("BREEASY_LISTEN_PORT").and_then(|value| value.parse::<u16>().ok()) {
        config.network.listen_port = port;
    }
    if let Some(port) = var("BREEASY_RESPONSE_PORT").and_then(|value| value.parse::<u16>().ok()) {
        config.network.response_port = port;
    }
    if let Some(path) = var("BREEASY_LOG_PATH").filter(|value| !value.is_empty()) {
        config.log_path = Some(PathBuf::from(path));
    }
}
