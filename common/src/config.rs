use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ports::{CLIENT_ID, DEFAULT_MAX_DATAGRAM_BYTES, LISTEN_PORT, RESPONSE_PORT};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HumidityConfig {
    pub open_threshold: f64,
    pub close_threshold: f64,
}

impl Default for HumidityConfig {
    fn default() -> Self {
        Self {
            open_threshold: 60.0,
            close_threshold: 50.0,
        }
    }
}

impl HumidityConfig {
    pub fn sanitize(&mut self) {
        let defaults = Self::default();
        if !self.open_threshold.is_finite() || !self.close_threshold.is_finite() {
            *self = defaults;
            return;
        }

        self.open_threshold = self.open_threshold.clamp(0.0, 100.0);
        self.close_threshold = self.close_threshold.clamp(0.0, 100.0);
        if self.close_threshold >= self.open_threshold {
            *self = defaults;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkConfig {
    pub bind_address: String,
    pub listen_port: u16,
    pub response_port: u16,
    pub client_id: String,
    pub max_datagram_bytes: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            listen_port: LISTEN_PORT,
            response_port: RESPONSE_PORT,
            client_id: CLIENT_ID.to_string(),
            max_datagram_bytes: DEFAULT_MAX_DATAGRAM_BYTES,
        }
    }
}

impl NetworkConfig {
    pub fn sanitize(&mut self) {
        if self.listen_port == self.response_port {
            self.listen_port = LISTEN_PORT;
            self.response_port = RESPONSE_PORT;
        }
        if self.client_id.trim().is_empty() {
            self.client_id = CLIENT_ID.to_string();
        }
        self.max_datagram_bytes = self.max_datagram_bytes.clamp(64, 65_507);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchdogConfig {
    pub interval_secs: u64,
    pub stale_after_secs: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            stale_after_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StatusStoreConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Window whose canonical state seeds the cache at startup.
    pub initial_window_id: u32,
}

impl Default for StatusStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "https://breeasy.azurewebsites.net/api".to_string(),
            request_timeout_ms: 5_000,
            initial_window_id: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProxyConfig {
    pub network: NetworkConfig,
    pub humidity: HumidityConfig,
    pub watchdog: WatchdogConfig,
    pub status_store: StatusStoreConfig,
    pub log_path: Option<PathBuf>,
}

impl ProxyConfig {
    pub fn sanitize(&mut self) {
        self.network.sanitize();
        self.humidity.sanitize();
        self.watchdog.interval_secs = self.watchdog.interval_secs.max(1);
        self.watchdog.stale_after_secs = self.watchdog.stale_after_secs.max(1);
        self.status_store.request_timeout_ms = self.status_store.request_timeout_ms.max(100);
        let trimmed = self.status_store.base_url.trim_end_matches('/').to_string();
        self.status_store.base_url = if trimmed.is_empty() {
            StatusStoreConfig::default().base_url
        } else {
            trimmed
        };
    }
}
