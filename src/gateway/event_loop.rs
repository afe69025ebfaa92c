//! Gateway event loop
//!
//! Single-task scheduler over the three services. Each pass races the camera
//! listener (only while no client is connected), the two UDP sockets, and a
//! bounded poll timeout; after the I/O dispatch every service gets its
//! periodic tick. The poll timeout is what bounds tick latency when no I/O
//! arrives.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use crate::camera::{CameraDevice, CameraSession};
use crate::command::CommandService;
use crate::error::Result;
use crate::gateway::config::GatewayConfig;
use crate::stats::StatsService;

/// The gateway process core
///
/// Owns all three services. Everything runs on the task that calls `run`,
/// so the camera and the subscriber registry have exactly one writer without
/// any locking.
pub struct Gateway<C: CameraDevice> {
    camera: CameraSession<C>,
    commands: CommandService,
    stats: StatsService,
    poll_timeout: Duration,
}

impl<C: CameraDevice> Gateway<C> {
    /// Bind all three sockets and assemble the services.
    ///
    /// Any bind failure here is fatal; the gateway does not start degraded.
    pub async fn bind(config: &GatewayConfig, camera: C) -> Result<Self> {
        let mut session = CameraSession::new(camera);
        session.listen(config.camera_addr()).await?;

        let commands = CommandService::bind(config.command_addr()).await?;
        let stats = StatsService::bind(config.stats_addr(), config.stats_period).await?;

        Ok(Self {
            camera: session,
            commands,
            stats,
            poll_timeout: config.poll_timeout,
        })
    }

    /// Actual bound address of the TCP video listener
    pub fn camera_addr(&self) -> Option<SocketAddr> {
        self.camera.local_addr()
    }

    /// Actual bound address of the UDP command socket
    pub fn command_addr(&self) -> Result<SocketAddr> {
        self.commands.local_addr()
    }

    /// Actual bound address of the UDP stats socket
    pub fn stats_addr(&self) -> Result<SocketAddr> {
        self.stats.local_addr()
    }

    /// Run the loop until an error propagates out of a dispatch.
    ///
    /// No teardown happens on the error path here; callers that want a clean
    /// exit use `run_until`.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            self.turn().await?;
        }
    }

    /// Run the loop until the shutdown future completes or a dispatch fails.
    ///
    /// Either way the camera and the listener are torn down before this
    /// returns. A shutdown is a graceful exit, not an error.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received");
                    break Ok(());
                }
                res = self.turn() => {
                    if let Err(e) = res {
                        break Err(e);
                    }
                }
            }
        };

        self.close();
        result
    }

    /// One loop pass: at most one I/O dispatch, then the periodic hooks.
    ///
    /// The accept arm is armed only while no client is streaming, which is
    /// recomputed every pass. Stats tick runs before the camera health tick.
    async fn turn(&mut self) -> Result<()> {
        let accept_armed = self.camera.is_listening();

        tokio::select! {
            res = self.camera.accept(), if accept_armed => res?,
            res = self.commands.recv() => res?,
            res = self.stats.recv() => res?,
            _ = tokio::time::sleep(self.poll_timeout) => {
                tracing::trace!("Poll timeout elapsed with no I/O");
            }
        }

        self.stats.periodic_tick().await;
        self.camera.periodic_tick();
        Ok(())
    }

    /// Tear down the camera session and listener. Idempotent.
    pub fn close(&mut self) {
        self.camera.close();
        tracing::info!("Gateway closed");
    }
}
