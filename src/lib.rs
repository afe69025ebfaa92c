//! Camera gateway for an embedded, camera-equipped device
//!
//! The gateway services three independent channels from a single task:
//!
//! - **TCP video** (default port 13367): exactly one client at a time; upon
//!   connection the camera pushes a raw, unframed byte stream into the client
//!   socket until either side dies.
//! - **UDP commands** (default port 13368): fire-and-forget text datagrams,
//!   received and logged.
//! - **UDP stats** (default port 13369): peers send `subscribe` /
//!   `unsubscribe`; registered peers receive a periodic status datagram.
//!
//! # Architecture
//!
//! ```text
//!                         Gateway (one task)
//!              ┌───────────────────────────────────┐
//!              │ select! over:                     │
//!              │   camera accept  (iff no client)  │
//!              │   command datagram                │
//!              │   stats datagram                  │
//!              │   poll timeout                    │
//!              │ then per-iteration ticks:         │
//!              │   stats broadcast, camera health  │
//!              └──────┬──────────┬──────────┬──────┘
//!                     │          │          │
//!                     ▼          ▼          ▼
//!              CameraSession  CommandService  StatsService
//!                     │                          │
//!                     ▼                          ▼
//!              CameraDevice pump          SubscriberRegistry
//! ```
//!
//! The listening socket is only armed for accept while no client is
//! connected, so a second client waits in the backlog until the current
//! session ends. Video transmission is a one-directional push owned by the
//! camera device; the gateway never reads from the client socket, so a dead
//! client is only detected by the camera health tick.

pub mod camera;
pub mod command;
pub mod error;
pub mod gateway;
pub mod stats;

pub use camera::{CameraDevice, CameraSession, SyntheticCamera};
pub use command::CommandService;
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayConfig};
pub use stats::{StatsService, SubscriberRegistry};

/// Largest accepted UDP datagram on the command and stats channels, in bytes.
pub const MAX_DATAGRAM: usize = 1000;
