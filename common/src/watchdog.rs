use chrono::{DateTime, Duration, Utc};

use crate::types::DeviceKind;

/// Arrival time of the most recent envelope from each device kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchdogState {
    last_sensor_message_at: Option<DateTime<Utc>>,
    last_controller_message_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleDevice {
    pub kind: DeviceKind,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl StaleDevice {
    pub fn silent_for(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_seen_at.map(|last| now - last)
    }
}

impl WatchdogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: DeviceKind, at: DateTime<Utc>) {
        match kind {
            DeviceKind::HumiditySensor => self.last_sensor_message_at = Some(at),
            DeviceKind::WindowController => self.last_controller_message_at = Some(at),
        }
    }

    pub fn last_seen(&self, kind: DeviceKind) -> Option<DateTime<Utc>> {
        match kind {
            DeviceKind::HumiditySensor => self.last_sensor_message_at,
            DeviceKind::WindowController => self.last_controller_message_at,
        }
    }

    /// Every kind silent for longer than `stale_after`. A kind never heard from
    /// counts as silent. Nothing is debounced: the same kind is reported on
    /// every call while the condition holds.
    pub fn stale_devices(&self, now: DateTime<Utc>, stale_after: Duration) -> Vec<StaleDevice> {
        DeviceKind::ALL
            .into_iter()
            .filter_map(|kind| {
                let last_seen_at = self.last_seen(kind);
                let stale = last_seen_at
                    .map(|last| now - last > stale_after)
                    .unwrap_or(true);
                stale.then_some(StaleDevice { kind, last_seen_at })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn never_seen_devices_are_stale() {
        let state = WatchdogState::new();

        let stale = state.stale_devices(at(0), Duration::seconds(60));

        assert_eq!(
            stale.iter().map(|device| device.kind).collect::<Vec<_>>(),
            vec![DeviceKind::HumiditySensor, DeviceKind::WindowController]
        );
    }

    #[test]
    fn each_kind_is_tracked_independently() {
        let mut state = WatchdogState::new();
        state.record(DeviceKind::HumiditySensor, at(0));
        state.record(DeviceKind::WindowController, at(50));

        let stale = state.stale_devices(at(100), Duration::seconds(60));

        assert_eq!(
            stale,
            vec![StaleDevice {
                kind: DeviceKind::HumiditySensor,
                last_seen_at: Some(at(0)),
            }]
        );
        assert_eq!(stale[0].silent_for(at(100)), Some(Duration::seconds(100)));
    }

    #[test]
    fn exactly_sixty_seconds_is_not_stale() {
        let mut state = WatchdogState::new();
        state.record(DeviceKind::HumiditySensor, at(0));
        state.record(DeviceKind::WindowController, at(0));

        assert!(state.stale_devices(at(60), Duration::seconds(60)).is_empty());
        assert_eq!(state.stale_devices(at(61), Duration::seconds(60)).len(), 2);
    }

    #[test]
    fn repeats_every_tick_until_fresh_message() {
        let mut state = WatchdogState::new();
        state.record(DeviceKind::WindowController, at(0));
        state.record(DeviceKind::HumiditySensor, at(0));

        assert_eq!(state.stale_devices(at(120), Duration::seconds(60)).len(), 2);
        assert_eq!(state.stale_devices(at(180), Duration::seconds(60)).len(), 2);

        state.record(DeviceKind::HumiditySensor, at(200));
        state.record(DeviceKind::WindowController, at(210));

        assert!(state.stale_devices(at(240), Duration::seconds(60)).is_empty());
    }
}
