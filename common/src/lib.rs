pub mod config;
pub mod control;
pub mod counters;
pub mod envelope;
pub mod humidity;
pub mod ports;
pub mod reconcile;
pub mod registry;
pub mod types;
pub mod watchdog;

pub use config::{HumidityConfig, NetworkConfig, ProxyConfig, StatusStoreConfig, WatchdogConfig};
pub use control::ControlState;
pub use counters::{CounterSnapshot, FailureCounters};
pub use envelope::{decode, ControllerPing, DecodeError, Envelope, Instruction, SensorReading};
pub use humidity::HumidityController;
pub use ports::*;
pub use reconcile::reconcile;
pub use registry::{DeviceRecord, DeviceRegistry, RegistryError};
pub use types::{ActionCause, ControllerAction, DeviceKind};
pub use watchdog::{StaleDevice, WatchdogState};
