//! Command channel
//!
//! Best-effort UDP ingestion point for diagnostic commands. Datagrams are
//! received, decoded as text, and logged; no interpretation happens here and
//! no reply is ever sent.

use std::net::SocketAddr;

use tokio::net::UdpSocket;

use crate::error::Result;
use crate::MAX_DATAGRAM;

/// UDP command receiver
pub struct CommandService {
    sock: UdpSocket,
    buf: Vec<u8>,
}

impl CommandService {
    /// Bind the command socket
    pub async fn bind(addr: SocketAddr) -> Result<Self> {
        let sock = UdpSocket::bind(addr).await?;
        tracing::info!(addr = %sock.local_addr()?, "Waiting for commands");

        Ok(Self {
            sock,
            buf: vec![0u8; MAX_DATAGRAM],
        })
    }

    /// Actual bound address of the command socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.sock.local_addr()?)
    }

    /// Receive and log one command datagram.
    ///
    /// A payload that is not valid UTF-8 is an error for the caller; there
    /// is no command-level recovery.
    pub async fn recv(&mut self) -> Result<()> {
        let (len, peer) = self.sock.recv_from(&mut self.buf).await?;
        let msg = std::str::from_utf8(&self.buf[..len])?;

        tracing::debug!(peer = %peer, msg = msg, "Command received");
        Ok(())
    }
}
