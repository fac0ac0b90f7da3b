use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{task::JoinHandle, time::Instant};
use tracing::{debug, warn};

use breeasy_common::{FailureCounters, StaleDevice, WatchdogConfig};

use crate::state::SharedHandle;

pub fn spawn(
    shared: SharedHandle,
    counters: Arc<FailureCounters>,
    config: WatchdogConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(config.interval_secs);
        let stale_after = chrono::Duration::seconds(config.stale_after_secs as i64);
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);

        loop {
            interval.tick().await;
            check(&shared, &counters, stale_after, Utc::now()).await;
            debug!(counters = ?counters.snapshot(), "proxy counters");
        }
    })
}

/// One watchdog pass. Warns once per silent device kind and takes no other
/// action.
pub async fn check(
    shared: &SharedHandle,
    counters: &FailureCounters,
    stale_after: chrono::Duration,
    now: DateTime<Utc>,
) -> Vec<StaleDevice> {
    let stale = {
        let shared = shared.lock().await;
        shared.watchdog.stale_devices(now, stale_after)
    };

    for device in &stale {
        counters.stale_warning();
        match device.silent_for(now) {
            Some(silent) => warn!(
                kind = device.kind.as_str(),
                silent_secs = silent.num_seconds(),
                "no data received from {} in the last {}s",
                device.kind.label(),
                stale_after.num_seconds()
            ),
            None => warn!(
                kind = device.kind.as_str(),
                "no data received from {} since startup",
                device.kind.label()
            ),
        }
    }

    stale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state;
    use breeasy_common::DeviceKind;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn warns_per_silent_kind_each_tick() {
        let shared = state::shared();
        let counters = FailureCounters::new();
        let window = chrono::Duration::seconds(60);
        {
            let mut guard = shared.lock().await;
            guard.watchdog.record(DeviceKind::HumiditySensor, at(0));
            guard.watchdog.record(DeviceKind::WindowController, at(30));
        }

        let first = check(&shared, &counters, window, at(75)).await;
        let second = check(&shared, &counters, window, at(135)).await;

        assert_eq!(first.len(), 1);
        assert_eq!(first[0].kind, DeviceKind::HumiditySensor);
        assert_eq!(second.len(), 2);
        assert_eq!(counters.snapshot().stale_warnings, 3);
    }

    #[tokio::test]
    async fn fresh_message_silences_next_tick() {
        let shared = state::shared();
        let counters = FailureCounters::new();
        let window = chrono::Duration::seconds(60);

        assert_eq!(check(&shared, &counters, window, at(60)).await.len(), 2);

        {
            let mut guard = shared.lock().await;
            guard.watchdog.record(DeviceKind::HumiditySensor, at(100));
            guard.watchdog.record(DeviceKind::WindowController, at(110));
        }

        assert!(check(&shared, &counters, window, at(120)).await.is_empty());
    }
}
