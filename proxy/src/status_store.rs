use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

use breeasy_common::StatusStoreConfig;

/// Any failure talking to the remote store. Callers treat every variant as
/// "remote unavailable this round" and never as a status value.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },
    #[error("unexpected body from {url}: {detail}")]
    Body { url: String, detail: String },
}

/// Canonical window state and room telemetry held in the cloud.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn fetch_window_open(&self, window_id: u32) -> Result<bool, StoreError>;

    async fn set_window_open(&self, window_id: u32, open: bool) -> Result<(), StoreError>;

    async fn push_humidity(&self, location_id: u32, humidity: f64) -> Result<(), StoreError>;

    async fn push_temperature(&self, location_id: u32, temperature: f64)
        -> Result<(), StoreError>;
}

pub struct HttpStatusStore {
    client: Client,
    base_url: String,
}

impl HttpStatusStore {
    pub fn new(config: &StatusStoreConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: String) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status { url, status });
        }

        response.json::<Value>().await.map_err(|err| StoreError::Body {
            url,
            detail: err.to_string(),
        })
    }

    async fn put_telemetry(&self, url: String, key: &str, value: f64) -> Result<(), StoreError> {
        let response = self
            .client
            .put(&url)
            .query(&[(key, value)])
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                url: url.clone(),
                source,
            })?;
        ensure_success(url, response.status())
    }
}

#[async_trait]
impl StatusStore for HttpStatusStore {
    async fn fetch_window_open(&self, window_id: u32) -> Result<bool, StoreError> {
        let url = window_status_url(&self.base_url, window_id);
        let body = self.get_json(url.clone()).await?;
        body.as_bool().ok_or_else(|| StoreError::Body {
            url,
            detail: format!("expected a boolean, got {body}"),
        })
    }

    async fn set_window_open(&self, window_id: u32, open: bool) -> Result<(), StoreError> {
        let url = window_record_url(&self.base_url, window_id);
        let mut record = self.get_json(url.clone()).await?;
        let Some(fields) = record.as_object_mut() else {
            return Err(StoreError::Body {
                url,
                detail: "window record is not an object".to_string(),
            });
        };
        fields.insert("isOpen".to_string(), Value::Bool(open));

        let response = self
            .client
            .put(&url)
            .json(&record)
            .send()
            .await
            .map_err(|source| StoreError::Transport {
                url: url.clone(),
                source,
            })?;
        ensure_success(url, response.status())
    }

    async fn push_humidity(&self, location_id: u32, humidity: f64) -> Result<(), StoreError> {
        let url = telemetry_url(&self.base_url, "humidity", location_id);
        self.put_telemetry(url, "humidity", humidity).await
    }

    async fn push_temperature(
        &self,
        location_id: u32,
        temperature: f64,
    ) -> Result<(), StoreError> {
        let url = telemetry_url(&self.base_url, "temperature", location_id);
        self.put_telemetry(url, "temperature", temperature).await
    }
}

fn ensure_success(url: String, status: StatusCode) -> Result<(), StoreError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(StoreError::Status { url, status })
    }
}

fn window_status_url(base: &str, window_id: u32) -> String {
    format!("{base}/windows/status/{window_id}")
}

fn window_record_url(base: &str, window_id: u32) -> String {
    format!("{base}/Windows/{window_id}")
}

fn telemetry_url(base: &str, metric: &str, location_id: u32) -> String {
    format!("{base}/Locations/{metric}/{location_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "https://example.invalid/api";

    #[test]
    fn builds_collaborator_urls() {
        assert_eq!(
            window_status_url(BASE, 1),
            "https://example.invalid/api/windows/status/1"
        );
        assert_eq!(
            window_record_url(BASE, 4),
            "https://example.invalid/api/Windows/4"
        );
        assert_eq!(
            telemetry_url(BASE, "humidity", 2),
            "https://example.invalid/api/Locations/humidity/2"
        );
    }

    #[test]
    fn client_trims_trailing_slash() {
        let store = HttpStatusStore::new(&StatusStoreConfig {
            base_url: format!("{BASE}/"),
            ..StatusStoreConfig::default()
        })
        .unwrap();

        assert_eq!(store.base_url, BASE);
    }

    #[test]
    fn non_success_status_is_an_error() {
        let err = ensure_success("u".to_string(), StatusCode::SERVICE_UNAVAILABLE).unwrap_err();
        assert!(matches!(err, StoreError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE));
        assert!(ensure_success("u".to_string(), StatusCode::NO_CONTENT).is_ok());
    }
}
