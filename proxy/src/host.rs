use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use breeasy_common::{FailureCounters, HumidityController, ProxyConfig};

use crate::{
    coordinator::Coordinator,
    listener::{DatagramListener, RecvErrorTracker},
    logging,
    sender::UdpInstructionSender,
    settings,
    state,
    status_store::HttpStatusStore,
    watchdog,
};

const RECV_ERROR_BACKOFF: Duration = Duration::from_millis(500);
const RECV_ERRORS_BEFORE_REBIND: u32 = 5;

pub async fn run() -> anyhow::Result<()> {
    let loaded = settings::load().await;
    let config = loaded.config;
    let _log_guard = logging::init(config.log_path.as_deref())?;

    info!("----- new session -----");
    if let Some(err) = loaded.fallback_reason {
        warn!("using default configuration: {err:#}");
    } else {
        info!("configuration loaded from {}", loaded.path.display());
    }

    let bind_addr: SocketAddr = format!(
        "{}:{}",
        config.network.bind_address, config.network.listen_port
    )
    .parse()
    .with_context(|| {
        format!(
            "invalid bind address {}:{}",
            config.network.bind_address, config.network.listen_port
        )
    })?;
    let mut listener = DatagramListener::bind(bind_addr, config.network.max_datagram_bytes).await?;

    let shared = state::shared();
    let counters = Arc::new(FailureCounters::new());
    let store = Arc::new(
        HttpStatusStore::new(&config.status_store).context("failed to build status store client")?,
    );
    let sender = Arc::new(UdpInstructionSender::new(config.network.response_port));
    let coordinator = Coordinator::new(
        shared.clone(),
        store,
        sender,
        HumidityController::new(config.humidity.clone()),
        counters.clone(),
        config.network.client_id.clone(),
    );

    coordinator
        .seed_from_store(config.status_store.initial_window_id)
        .await;

    let watchdog = watchdog::spawn(shared, counters, config.watchdog.clone());

    log_startup(&config, listener.local_addr().unwrap_or(bind_addr));

    tokio::select! {
        _ = receive_loop(&mut listener, &coordinator) => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                warn!("failed to listen for shutdown signal: {err}");
            }
            info!("receiver stopped by user");
        }
    }

    watchdog.abort();
    drop(listener);
    info!("listener socket closed, exiting");
    Ok(())
}

async fn receive_loop(listener: &mut DatagramListener, coordinator: &Coordinator) {
    let mut errors = RecvErrorTracker::new(RECV_ERRORS_BEFORE_REBIND);

    loop {
        match listener.recv().await {
            Ok((payload, source)) => {
                errors.record_success();
                coordinator
                    .handle_datagram(payload, source, Utc::now())
                    .await;
            }
            Err(err) => {
                let rebind = errors.record_failure();
                warn!("receive failed ({} in a row): {err}", errors.consecutive());

                if rebind {
                    match listener.rebind().await {
                        Ok(()) => {
                            info!("receive socket re-bound");
                            errors.record_rebind();
                        }
                        Err(err) => warn!("failed to re-bind receive socket: {err}"),
                    }
                }
                tokio::time::sleep(RECV_ERROR_BACKOFF).await;
            }
        }
    }
}

fn log_startup(config: &ProxyConfig, local_addr: SocketAddr) {
    info!(
        client_id = %config.network.client_id,
        response_port = config.network.response_port,
        open_threshold = config.humidity.open_threshold,
        close_threshold = config.humidity.close_threshold,
        status_store = %config.status_store.base_url,
        "listening for broadcasts on {local_addr}"
    );
}
