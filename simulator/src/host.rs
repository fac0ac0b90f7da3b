use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::Context;
use chrono::Utc;
use tokio::net::UdpSocket;
use tracing::{info, warn};

use breeasy_common::{
    ControllerPing, Envelope, Instruction, SensorReading, LISTEN_PORT, RESPONSE_PORT,
    SENSOR_EPOCH_OFFSET_SECS,
};

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let target_ip = std::env::var("SIM_TARGET")
        .ok()
        .and_then(|value| value.parse::<IpAddr>().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::BROADCAST));
    let listen_port = env_or("SIM_LISTEN_PORT", LISTEN_PORT);
    let response_port = env_or("SIM_RESPONSE_PORT", RESPONSE_PORT);
    let interval_secs = env_or("SIM_INTERVAL_SECS", 5u64).max(1);
    let device_id = env_or("SIM_DEVICE_ID", 1u32);

    let broadcast = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .await
        .context("failed to bind broadcast socket")?;
    broadcast
        .set_broadcast(true)
        .context("failed to enable broadcast")?;

    let replies = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, response_port))
        .await
        .with_context(|| format!("failed to bind reply socket on port {response_port}"))?;
    tokio::spawn(receive_instructions(replies));

    let target = SocketAddr::new(target_ip, listen_port);
    info!("simulating sensor and window controller {device_id}, broadcasting to {target}");

    let mut tick: u64 = 0;
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;
        tick = tick.saturating_add(1);

        let now = Utc::now().timestamp();
        let humidity = simulated_humidity(tick);
        let reading = Envelope::SensorReading(SensorReading {
            id: device_id,
            temperature: Some(21.0 + (tick % 4) as f64 * 0.5),
            humidity: Some(humidity),
            last_updated: Some((now - SENSOR_EPOCH_OFFSET_SECS) as f64),
        });
        let ping = Envelope::ControllerPing(ControllerPing {
            id: device_id,
            message: Some("should i open?".to_string()),
            last_updated: Some(now as f64),
        });

        for envelope in [reading, ping] {
            let payload = envelope.encode().context("failed to encode envelope")?;
            if let Err(err) = broadcast.send_to(&payload, target).await {
                warn!("{} broadcast failed: {err}", envelope.kind());
            }
        }
        info!(humidity, "broadcast tick {tick}");
    }
}

async fn receive_instructions(socket: UdpSocket) {
    let mut buffer = [0u8; 1024];
    loop {
        match socket.recv_from(&mut buffer).await {
            Ok((len, source)) => match Instruction::decode(&buffer[..len]) {
                Ok(instruction) => info!(
                    %source,
                    from = %instruction.source,
                    "window should {}",
                    if instruction.should_open { "open" } else { "close" }
                ),
                Err(err) => warn!(%source, "ignoring reply: {err}"),
            },
            Err(err) => {
                warn!("reply receive failed: {err}");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

/// Humidity ramps from 40% to 70% and back over 24 ticks so both hysteresis
/// edges get crossed.
fn simulated_humidity(tick: u64) -> f64 {
    let phase = (tick % 24) as f64;
    let rise = if phase < 12.0 { phase } else { 24.0 - phase };
    40.0 + rise * 2.5
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn humidity_sweep_crosses_both_thresholds() {
        let samples: Vec<f64> = (0..24).map(simulated_humidity).collect();

        assert_eq!(samples[0], 40.0);
        assert_eq!(samples[12], 70.0);
        assert!(samples.iter().any(|h| *h >= 60.0));
        assert!(samples.iter().any(|h| *h < 50.0));
        assert!(samples.iter().all(|h| (40.0..=70.0).contains(h)));
    }
}
