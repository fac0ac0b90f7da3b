use std::{
    io,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::UdpSocket;

use breeasy_common::{Instruction, RegistryError};

#[derive(Debug, Error)]
pub enum SendError {
    #[error("unresolved destination: {0}")]
    UnresolvedDestination(#[from] RegistryError),
    #[error("failed to encode instruction: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("datagram send failed: {0}")]
    Io(#[from] io::Error),
}

/// One-shot, unacknowledged delivery of an instruction to a device.
#[async_trait]
pub trait InstructionSink: Send + Sync {
    async fn send(&self, instruction: &Instruction, destination: IpAddr) -> Result<(), SendError>;
}

/// Sends each instruction from its own ephemeral socket, released as soon as
/// the datagram is out. No retry.
pub struct UdpInstructionSender {
    response_port: u16,
}

impl UdpInstructionSender {
    pub fn new(response_port: u16) -> Self {
        Self { response_port }
    }
}

#[async_trait]
impl InstructionSink for UdpInstructionSender {
    async fn send(&self, instruction: &Instruction, destination: IpAddr) -> Result<(), SendError> {
        let payload = instruction.encode()?;
        let local: SocketAddr = match destination {
            IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };

        let socket = UdpSocket::bind(local).await?;
        socket.set_broadcast(true)?;
        socket
            .send_to(&payload, SocketAddr::new(destination, self.response_port))
            .await?;
        Ok(())
    }
}
