use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::DeviceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no {0} has been observed yet")]
    NotFound(DeviceKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceRecord {
    pub kind: DeviceKind,
    pub last_seen_address: SocketAddr,
    pub last_seen_at: DateTime<Utc>,
}

/// Where to reach each device role.
///
/// Keyed by role, not by unit: the most recent sender of a kind is the one
/// instructions for that kind are addressed to. Records are never removed.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    records: HashMap<DeviceKind, DeviceRecord>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, kind: DeviceKind, address: SocketAddr, now: DateTime<Utc>) {
        self.records.insert(
            kind,
            DeviceRecord {
                kind,
                last_seen_address: address,
                last_seen_at: now,
            },
        );
    }

    pub fn lookup(&self, kind: DeviceKind) -> Result<IpAddr, RegistryError> {
        self.records
            .get(&kind)
            .map(|record| record.last_seen_address.ip())
            .ok_or(RegistryError::NotFound(kind))
    }

    pub fn record(&self, kind: DeviceKind) -> Option<&DeviceRecord> {
        self.records.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
