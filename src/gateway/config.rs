//! Gateway configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Gateway configuration options
///
/// Created once at startup and read-only afterwards.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to bind all three sockets on
    pub host: IpAddr,

    /// TCP port the video stream is served on
    pub camera_port: u16,

    /// UDP port commands are received on
    pub command_port: u16,

    /// UDP port stats subscriptions and broadcasts go through
    pub stats_port: u16,

    /// Video width in pixels
    pub video_width: u32,

    /// Video height in pixels
    pub video_height: u32,

    /// Video framerate in frames per second
    pub video_framerate: u32,

    /// Period between stats broadcasts
    pub stats_period: Duration,

    /// Bounded wait of one event-loop pass; also the granularity of the
    /// periodic maintenance ticks
    pub poll_timeout: Duration,

    /// Force trace-level logging
    pub log_all: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            camera_port: 13367,
            command_port: 13368,
            stats_port: 13369,
            video_width: 1200,
            video_height: 800,
            video_framerate: 24,
            stats_period: Duration::from_millis(200),
            poll_timeout: Duration::from_millis(100),
            log_all: false,
        }
    }
}

impl GatewayConfig {
    /// Set the bind host
    pub fn host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Set the TCP video port
    pub fn camera_port(mut self, port: u16) -> Self {
        self.camera_port = port;
        self
    }

    /// Set the UDP command port
    pub fn command_port(mut self, port: u16) -> Self {
        self.command_port = port;
        self
    }

    /// Set the UDP stats port
    pub fn stats_port(mut self, port: u16) -> Self {
        self.stats_port = port;
        self
    }

    /// Set the video geometry
    pub fn video_size(mut self, width: u32, height: u32) -> Self {
        self.video_width = width;
        self.video_height = height;
        self
    }

    /// Set the video framerate
    pub fn video_framerate(mut self, framerate: u32) -> Self {
        self.video_framerate = framerate;
        self
    }

    /// Set the stats broadcast period
    pub fn stats_period(mut self, period: Duration) -> Self {
        self.stats_period = period;
        self
    }

    /// Set the event-loop poll timeout
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Socket address of the TCP video listener
    pub fn camera_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.camera_port)
    }

    /// Socket address of the UDP command socket
    pub fn command_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.command_port)
    }

    /// Socket address of the UDP stats socket
    pub fn stats_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.stats_port)
    }
}
