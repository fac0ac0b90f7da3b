use std::{io, net::SocketAddr};

use anyhow::Context;
use tokio::net::UdpSocket;

/// The proxy's long-lived receive socket. Bound once at startup; only
/// re-bound on the error path after repeated receive failures.
pub struct DatagramListener {
    bind_addr: SocketAddr,
    socket: Option<UdpSocket>,
    buffer: Vec<u8>,
}

impl DatagramListener {
    pub async fn bind(bind_addr: SocketAddr, max_datagram_bytes: usize) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind receive socket at {bind_addr}"))?;
        // Pin an ephemeral port so a re-bind comes back on the same one.
        let bind_addr = socket.local_addr().unwrap_or(bind_addr);

        Ok(Self {
            bind_addr,
            socket: Some(socket),
            buffer: vec![0; max_datagram_bytes],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        match &self.socket {
            Some(socket) => socket.local_addr(),
            None => Err(not_bound()),
        }
    }

    /// Waits for the next datagram. Anything beyond the buffer size is cut off
    /// and will fail to decode.
    pub async fn recv(&mut self) -> io::Result<(&[u8], SocketAddr)> {
        let Some(socket) = &self.socket else {
            return Err(not_bound());
        };
        let (len, source) = socket.recv_from(&mut self.buffer).await?;
        Ok((&self.buffer[..len], source))
    }

    pub async fn rebind(&mut self) -> io::Result<()> {
        drop(self.socket.take());
        self.socket = Some(UdpSocket::bind(self.bind_addr).await?);
        Ok(())
    }
}

/// Counts consecutive receive failures and decides when the socket has to be
/// re-bound.
#[derive(Debug)]
pub struct RecvErrorTracker {
    consecutive: u32,
    rebind_after: u32,
}

impl RecvErrorTracker {
    pub fn new(rebind_after: u32) -> Self {
        Self {
            consecutive: 0,
            rebind_after: rebind_after.max(1),
        }
    }

    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    pub fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// Returns `true` once the failure streak reaches the re-bind limit.
    pub fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive >= self.rebind_after
    }

    pub fn record_rebind(&mut self) {
        self.consecutive = 0;
    }
}

fn not_bound() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "receive socket is not bound")
}
