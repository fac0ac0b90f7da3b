use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{ports::SENSOR_EPOCH_OFFSET_SECS, types::DeviceKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("unknown envelope type `{0}`")]
    UnknownEnvelopeType(String),
}

/// Periodic reading broadcast by the humidity sensor.
///
/// Absent fields stay `None`; nothing is defaulted to a measurement value.
/// `last_updated` is in the sensor's own epoch (seconds since 2000-01-01).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<f64>,
}

impl SensorReading {
    /// Reading time converted to Unix time.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_updated
            .and_then(|secs| epoch_seconds_to_utc(secs, SENSOR_EPOCH_OFFSET_SECS))
    }
}

/// Liveness ping broadcast by the window controller. Carries no desired
/// state, only its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerPing {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<f64>,
}

impl ControllerPing {
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_updated
            .and_then(|secs| epoch_seconds_to_utc(secs, 0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Envelope {
    #[serde(rename = "dht11")]
    SensorReading(SensorReading),
    #[serde(rename = "window_controller")]
    ControllerPing(ControllerPing),
}

impl Envelope {
    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::SensorReading(_) => DeviceKind::HumiditySensor,
            Self::ControllerPing(_) => DeviceKind::WindowController,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::SensorReading(reading) => reading.id,
            Self::ControllerPing(ping) => ping.id,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Parses one datagram into a validated envelope.
pub fn decode(bytes: &[u8]) -> Result<Envelope, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| DecodeError::MalformedPayload(format!("invalid utf-8: {err}")))?;
    let value: Value = serde_json::from_str(text)
        .map_err(|err| DecodeError::MalformedPayload(format!("invalid json: {err}")))?;

    let tag = match value.get("type") {
        Some(Value::String(tag)) => tag.clone(),
        Some(other) => {
            return Err(DecodeError::MalformedPayload(format!(
                "`type` must be a string, got {other}"
            )))
        }
        None if value.is_object() => {
            return Err(DecodeError::MalformedPayload(
                "missing `type` field".to_string(),
            ))
        }
        None => {
            return Err(DecodeError::MalformedPayload(
                "envelope is not a JSON object".to_string(),
            ))
        }
    };

    let Some(kind) = DeviceKind::from_tag(&tag) else {
        return Err(DecodeError::UnknownEnvelopeType(tag));
    };

    let envelope = match kind {
        DeviceKind::HumiditySensor => {
            serde_json::from_value::<SensorReading>(value).map(Envelope::SensorReading)
        }
        DeviceKind::WindowController => {
            serde_json::from_value::<ControllerPing>(value).map(Envelope::ControllerPing)
        }
    };

    envelope.map_err(|err| DecodeError::MalformedPayload(format!("invalid {kind} envelope: {err}")))
}

/// Directed reply telling the window controller which way to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub source: String,
    pub should_open: bool,
}

impl Instruction {
    pub fn new(source: impl Into<String>, should_open: bool) -> Self {
        Self {
            source: source.into(),
            should_open,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes)
            .map_err(|err| DecodeError::MalformedPayload(format!("invalid instruction: {err}")))
    }
}

fn epoch_seconds_to_utc(secs: f64, offset_secs: i64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9) as u32;
    DateTime::from_timestamp((whole as i64).checked_add(offset_secs)?, nanos)
}
