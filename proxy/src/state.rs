use std::sync::Arc;

use tokio::sync::Mutex;

use breeasy_common::{ControlState, DeviceRegistry, WatchdogState};

/// Everything the coordination loop and the watchdog both touch. Always
/// accessed through the one mutex in [`SharedHandle`].
#[derive(Debug, Default)]
pub struct SharedState {
    pub control: ControlState,
    pub registry: DeviceRegistry,
    pub watchdog: WatchdogState,
}

pub type SharedHandle = Arc<Mutex<SharedState>>;

pub fn shared() -> SharedHandle {
    Arc::new(Mutex::new(SharedState::default()))
}
