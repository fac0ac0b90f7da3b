use serde::{Deserialize, Serialize};

/// Role a device plays on the broadcast network. Instructions and liveness
/// are tracked per role, not per physical unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeviceKind {
    #[serde(rename = "dht11")]
    HumiditySensor,
    #[serde(rename = "window_controller")]
    WindowController,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 2] = [Self::HumiditySensor, Self::WindowController];

    /// Tag carried in the `type` field of the wire envelope.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HumiditySensor => "dht11",
            Self::WindowController => "window_controller",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "dht11" => Some(Self::HumiditySensor),
            "window_controller" => Some(Self::WindowController),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::HumiditySensor => "humidity sensor",
            Self::WindowController => "window controller",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an instruction was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCause {
    HumidityHigh,
    HumidityNormal,
    Reconcile,
}

impl ActionCause {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HumidityHigh => "HUMIDITY_HIGH",
            Self::HumidityNormal => "HUMIDITY_NORMAL",
            Self::Reconcile => "RECONCILE",
        }
    }
}

/// A decision to move the window, produced by the humidity controller or the
/// status reconciler and carried out by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerAction {
    pub should_open: bool,
    pub cause: ActionCause,
}

impl ControllerAction {
    pub fn open(cause: ActionCause) -> Self {
        Self {
            should_open: true,
            cause,
        }
    }

    pub fn close(cause: ActionCause) -> Self {
        Self {
            should_open: false,
            cause,
        }
    }

    /// Whether the action originates from the humidity controller and must be
    /// mirrored to the status store.
    pub fn is_humidity_driven(&self) -> bool {
        matches!(
            self.cause,
            ActionCause::HumidityHigh | ActionCause::HumidityNormal
        )
    }
}
