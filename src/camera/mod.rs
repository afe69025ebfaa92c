//! Camera streaming
//!
//! This module provides:
//! - The `CameraDevice` seam behind which capture and encoding live
//! - The single-client TCP streaming session and its lifecycle
//! - A synthetic test-pattern source for running without hardware

pub mod device;
pub mod session;
pub mod synthetic;

pub use device::CameraDevice;
pub use session::{CameraSession, SessionState};
pub use synthetic::SyntheticCamera;
