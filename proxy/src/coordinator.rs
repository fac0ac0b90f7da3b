use std::{net::SocketAddr, sync::Arc};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use breeasy_common::{
    decode, reconcile, ControllerAction, ControllerPing, DeviceKind, Envelope, FailureCounters,
    HumidityController, Instruction, SensorReading,
};

use crate::{
    sender::{InstructionSink, SendError},
    state::SharedHandle,
    status_store::StatusStore,
};

/// Processes one datagram at a time: decode, record the sender, route to the
/// humidity controller or the reconciler, then carry out any resulting
/// instruction.
///
/// State is only mutated while holding the shared lock, and the lock is never
/// held across a remote call.
pub struct Coordinator {
    shared: SharedHandle,
    store: Arc<dyn StatusStore>,
    sink: Arc<dyn InstructionSink>,
    humidity: HumidityController,
    counters: Arc<FailureCounters>,
    client_id: String,
}

impl Coordinator {
    pub fn new(
        shared: SharedHandle,
        store: Arc<dyn StatusStore>,
        sink: Arc<dyn InstructionSink>,
        humidity: HumidityController,
        counters: Arc<FailureCounters>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            shared,
            store,
            sink,
            humidity,
            counters,
            client_id: client_id.into(),
        }
    }

    /// Seeds the cached window state from the store. Leaves it unknown if the
    /// store cannot be reached.
    pub async fn seed_from_store(&self, window_id: u32) {
        match self.store.fetch_window_open(window_id).await {
            Ok(open) => {
                self.shared.lock().await.control.set_window_open(open);
                info!(window_id, open, "seeded window state from status store");
            }
            Err(err) => {
                self.counters.remote_failed();
                warn!(window_id, "initial window status fetch failed: {err}");
            }
        }
    }

    pub async fn handle_datagram(
        &self,
        payload: &[u8],
        source: SocketAddr,
        received_at: DateTime<Utc>,
    ) -> Option<ControllerAction> {
        self.counters.datagram_received();
        info!(
            %source,
            data = %String::from_utf8_lossy(payload),
            "received datagram"
        );

        let envelope = match decode(payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                self.counters.decode_failed();
                warn!(
                    %source,
                    raw = %String::from_utf8_lossy(payload),
                    "dropping datagram: {err}"
                );
                return None;
            }
        };

        {
            let mut shared = self.shared.lock().await;
            shared.registry.observe(envelope.kind(), source, received_at);
            shared.watchdog.record(envelope.kind(), received_at);
        }

        match &envelope {
            Envelope::SensorReading(reading) => self.on_sensor_reading(reading, source).await,
            Envelope::ControllerPing(ping) => self.on_controller_ping(ping, source).await,
        }
    }

    async fn on_sensor_reading(
        &self,
        reading: &SensorReading,
        source: SocketAddr,
    ) -> Option<ControllerAction> {
        info!(
            %source,
            id = reading.id,
            temperature = ?reading.temperature,
            humidity = ?reading.humidity,
            reported_at = ?reading.timestamp(),
            "sensor reading"
        );

        self.spawn_telemetry(reading);

        let action = {
            let mut shared = self.shared.lock().await;
            self.humidity.on_sensor_reading(&mut shared.control, reading)
        }?;

        info!(
            id = reading.id,
            cause = action.cause.as_str(),
            should_open = action.should_open,
            "humidity threshold crossed"
        );

        // The store only learns about positions the controller was told to
        // take, so an undelivered instruction still shows up as a divergence
        // on the next ping.
        if !self.dispatch(action).await {
            return Some(action);
        }

        if let Err(err) = self
            .store
            .set_window_open(reading.id, action.should_open)
            .await
        {
            self.counters.remote_failed();
            warn!(
                id = reading.id,
                should_open = action.should_open,
                "window status update failed: {err}"
            );
        }

        Some(action)
    }

    async fn on_controller_ping(
        &self,
        ping: &ControllerPing,
        source: SocketAddr,
    ) -> Option<ControllerAction> {
        info!(
            %source,
            id = ping.id,
            message = ping.message.as_deref().unwrap_or(""),
            reported_at = ?ping.timestamp(),
            "controller ping"
        );

        let canonical = match self.store.fetch_window_open(ping.id).await {
            Ok(open) => open,
            Err(err) => {
                self.counters.remote_failed();
                warn!(
                    id = ping.id,
                    "window status fetch failed, skipping reconciliation: {err}"
                );
                return None;
            }
        };

        let action = {
            let mut shared = self.shared.lock().await;
            reconcile(&mut shared.control, canonical)
        };

        match action {
            Some(action) => {
                info!(
                    id = ping.id,
                    should_open = action.should_open,
                    "canonical window status changed"
                );
                self.dispatch(action).await;
            }
            None => debug!(id = ping.id, canonical, "window status unchanged"),
        }

        action
    }

    /// Pushes whatever measurements the reading carries in the background.
    /// Failures are counted and logged, never waited on.
    fn spawn_telemetry(&self, reading: &SensorReading) {
        if reading.humidity.is_none() && reading.temperature.is_none() {
            return;
        }

        let store = Arc::clone(&self.store);
        let counters = Arc::clone(&self.counters);
        let (id, humidity, temperature) = (reading.id, reading.humidity, reading.temperature);

        tokio::spawn(async move {
            if let Some(humidity) = humidity {
                if let Err(err) = store.push_humidity(id, humidity).await {
                    counters.remote_failed();
                    warn!(id, "humidity update failed: {err}");
                }
            }

            if let Some(temperature) = temperature {
                if let Err(err) = store.push_temperature(id, temperature).await {
                    counters.remote_failed();
                    warn!(id, "temperature update failed: {err}");
                }
            }
        });
    }

    /// Sends the instruction to the most recently seen window controller.
    /// Returns whether it went out.
    async fn dispatch(&self, action: ControllerAction) -> bool {
        let instruction = Instruction::new(self.client_id.clone(), action.should_open);
        let destination = {
            let shared = self.shared.lock().await;
            shared.registry.lookup(DeviceKind::WindowController)
        };

        let result = match destination {
            Ok(ip) => self.sink.send(&instruction, ip).await.map(|()| ip),
            Err(err) => Err(SendError::from(err)),
        };

        match result {
            Ok(ip) => {
                self.counters.instruction_sent();
                info!(
                    destination = %ip,
                    should_open = instruction.should_open,
                    cause = action.cause.as_str(),
                    "sent instruction"
                );
                true
            }
            Err(err @ SendError::UnresolvedDestination(_)) => {
                self.counters.destination_unresolved();
                warn!(
                    should_open = instruction.should_open,
                    "instruction suppressed: {err}"
                );
                false
            }
            Err(err) => {
                self.counters.send_failed();
                warn!(should_open = instruction.should_open, "{err}");
                false
            }
        }
    }
}
