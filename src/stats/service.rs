//! Stats channel
//!
//! Subscription handling and the timer-gated status broadcast. Peers send
//! the literal tokens `subscribe` / `unsubscribe`; registered peers get a
//! timestamped status datagram once per period. Delivery is fire-and-forget.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tokio::net::UdpSocket;

use crate::error::Result;
use crate::stats::registry::SubscriberRegistry;
use crate::MAX_DATAGRAM;

const SUBSCRIBE: &str = "subscribe";
const UNSUBSCRIBE: &str = "unsubscribe";

/// UDP stats receiver and broadcaster
pub struct StatsService {
    sock: UdpSocket,
    registry: SubscriberRegistry,
    last_sent: Instant,
    period: Duration,
    buf: Vec<u8>,
}

impl StatsService {
    /// Bind the stats socket. The broadcast timer starts now, so the first
    /// broadcast happens no earlier than one period from this call.
    pub async fn bind(addr: SocketAddr, period: Duration) -> Result<Self> {
        let sock = UdpSocket::bind(addr).await?;
        tracing::info!(addr = %sock.local_addr()?, "Waiting for stats subscriptions");

        Ok(Self {
            sock,
            registry: SubscriberRegistry::new(),
            last_sent: Instant::now(),
            period,
            buf: vec![0u8; MAX_DATAGRAM],
        })
    }

    /// Actual bound address of the stats socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.sock.local_addr()?)
    }

    /// Number of currently registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Receive one control datagram and update the registry.
    ///
    /// Unknown payloads are logged and ignored. Nothing is ever sent back.
    pub async fn recv(&mut self) -> Result<()> {
        let (len, peer) = self.sock.recv_from(&mut self.buf).await?;
        let msg = std::str::from_utf8(&self.buf[..len])?;

        match msg {
            SUBSCRIBE => {
                if self.registry.subscribe(peer) {
                    tracing::info!(peer = %peer, "Subscribed for stats");
                } else {
                    tracing::debug!(peer = %peer, "Already subscribed for stats");
                }
            }
            UNSUBSCRIBE => {
                if self.registry.unsubscribe(peer) {
                    tracing::info!(peer = %peer, "Unsubscribed from stats");
                } else {
                    tracing::info!(peer = %peer, "Unsubscribe from unknown client");
                }
            }
            other => {
                tracing::info!(peer = %peer, msg = other, "Unknown stats message");
            }
        }

        Ok(())
    }

    /// Timer-gated broadcast, run once per loop pass.
    ///
    /// Skips while nobody is subscribed or while the period has not elapsed
    /// on the monotonic clock. A failed send is logged and does not remove
    /// the subscriber or stop the remaining sends.
    pub async fn periodic_tick(&mut self) {
        if self.registry.is_empty() {
            tracing::trace!("No stats subscribers, skipping broadcast");
            return;
        }

        if self.last_sent.elapsed() < self.period {
            tracing::trace!("Too soon to send stats");
            return;
        }

        self.last_sent = Instant::now();

        let payload = build_payload();
        tracing::debug!(payload = %payload, subscribers = self.registry.len(), "Sending stats");

        for &peer in self.registry.iter() {
            if let Err(e) = self.sock.send_to(payload.as_bytes(), peer).await {
                tracing::warn!(peer = %peer, error = %e, "Failed to send stats");
            }
        }
    }
}

fn build_payload() -> String {
    format!(
        "Stats at {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;
    use tokio_test::assert_ok;

    const PERIOD: Duration = Duration::from_millis(50);

    async fn service_and_client() -> (StatsService, UdpSocket, SocketAddr) {
        let service = StatsService::bind("127.0.0.1:0".parse().unwrap(), PERIOD)
            .await
            .unwrap();
        let addr = service.local_addr().unwrap();
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        (service, client, addr)
    }

    async fn send_and_dispatch(service: &mut StatsService, client: &UdpSocket, msg: &str, addr: SocketAddr) {
        client.send_to(msg.as_bytes(), addr).await.unwrap();
        let result = timeout(Duration::from_secs(1), service.recv())
            .await
            .expect("datagram not dispatched");
        assert_ok!(result);
    }

    async fn recv_payload(client: &UdpSocket) -> Option<String> {
        let mut buf = [0u8; MAX_DATAGRAM];
        match timeout(Duration::from_millis(25), client.recv_from(&mut buf)).await {
            Ok(Ok((len, _))) => Some(String::from_utf8_lossy(&buf[..len]).into_owned()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_subscribe_unsubscribe_bookkeeping() {
        let (mut service, client, addr) = service_and_client().await;

        send_and_dispatch(&mut service, &client, "subscribe", addr).await;
        assert_eq!(service.subscriber_count(), 1);

        // Re-subscribing the same peer is a no-op
        send_and_dispatch(&mut service, &client, "subscribe", addr).await;
        assert_eq!(service.subscriber_count(), 1);

        // Unknown payloads are ignored
        send_and_dispatch(&mut service, &client, "status please", addr).await;
        assert_eq!(service.subscriber_count(), 1);

        send_and_dispatch(&mut service, &client, "unsubscribe", addr).await;
        assert_eq!(service.subscriber_count(), 0);

        // Unsubscribing an absent peer is non-fatal
        send_and_dispatch(&mut service, &client, "unsubscribe", addr).await;
        assert_eq!(service.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_broadcast_skipped_while_registry_empty() {
        let (mut service, client, _addr) = service_and_client().await;

        tokio::time::sleep(PERIOD + Duration::from_millis(20)).await;
        service.periodic_tick().await;

        // Client never subscribed, so nothing may arrive
        assert!(recv_payload(&client).await.is_none());
    }

    #[tokio::test]
    async fn test_broadcast_gated_by_period() {
        let (mut service, client, addr) = service_and_client().await;
        send_and_dispatch(&mut service, &client, "subscribe", addr).await;

        tokio::time::sleep(PERIOD + Duration::from_millis(20)).await;
        service.periodic_tick().await;
        let first = recv_payload(&client).await.expect("first broadcast missing");
        assert!(first.starts_with("Stats at "));

        // Immediately after a send, the gate must hold
        service.periodic_tick().await;
        assert!(recv_payload(&client).await.is_none());

        tokio::time::sleep(PERIOD + Duration::from_millis(20)).await;
        service.periodic_tick().await;
        assert!(recv_payload(&client).await.is_some());
    }

    #[test]
    fn test_payload_format() {
        let payload = build_payload();
        // "Stats at YYYY-MM-DD HH:MM:SS.ffffff"
        assert!(payload.starts_with("Stats at "));
        let stamp = &payload["Stats at ".len()..];
        assert_eq!(stamp.len(), "2026-01-01 00:00:00.000000".len());
        assert!(chrono::NaiveDateTime::parse_from_str(stamp, "%Y-%m-%d %H:%M:%S%.6f").is_ok());
    }
}
