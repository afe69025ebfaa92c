//! Synthetic camera source
//!
//! Stands in for real capture hardware: pushes fixed-size filler frames at
//! the configured framerate from a background pump task. Lets the gateway and
//! its tests exercise the full streaming path without a camera attached.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::watch;

use crate::camera::device::CameraDevice;
use crate::error::{GatewayError, Result};

/// Annex-B style start code prefixed to every filler frame
const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// A test-pattern camera.
///
/// Frame size scales with the configured geometry so bitrates are at least
/// plausible. The pump parks its first write error where `check_recording`
/// picks it up; a dropped client therefore surfaces exactly like a hardware
/// fault would.
pub struct SyntheticCamera {
    width: u32,
    height: u32,
    framerate: u32,
    pump: Option<RecordingPump>,
}

/// Handles into the running pump task
struct RecordingPump {
    stop: watch::Sender<bool>,
    error: watch::Receiver<Option<String>>,
}

impl SyntheticCamera {
    /// Create a camera with the given geometry and framerate
    pub fn new(width: u32, height: u32, framerate: u32) -> Self {
        Self {
            width,
            height,
            framerate: framerate.max(1),
            pump: None,
        }
    }

    /// Whether a recording pump is currently attached
    pub fn is_recording(&self) -> bool {
        self.pump.is_some()
    }

    fn frame_template(&self) -> Bytes {
        // ~1/64 byte per pixel of filler keeps the stream light but nonempty
        let payload_len = ((self.width * self.height) / 64).max(16) as usize;
        let mut buf = BytesMut::with_capacity(START_CODE.len() + payload_len);
        buf.put_slice(&START_CODE);
        buf.put_bytes(0, payload_len);
        buf.freeze()
    }
}

impl CameraDevice for SyntheticCamera {
    fn start_recording(&mut self, sink: TcpStream) -> Result<()> {
        if self.pump.is_some() {
            return Err(GatewayError::Camera("recording already in progress".into()));
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (err_tx, err_rx) = watch::channel(None);
        let frame = self.frame_template();
        let tick = Duration::from_secs(1) / self.framerate;

        tokio::spawn(async move {
            let mut sink = sink;
            let mut ticker = tokio::time::interval(tick);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = sink.write_all(&frame).await {
                            let _ = err_tx.send(Some(e.to_string()));
                            break;
                        }
                    }
                    // Stop requested, or the camera itself was dropped
                    _ = stop_rx.changed() => break,
                }
            }
        });

        self.pump = Some(RecordingPump {
            stop: stop_tx,
            error: err_rx,
        });

        Ok(())
    }

    fn check_recording(&mut self) -> Result<()> {
        match &self.pump {
            Some(pump) => match pump.error.borrow().clone() {
                Some(e) => Err(GatewayError::Camera(e)),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }

    fn stop_recording(&mut self) -> Result<()> {
        match self.pump.take() {
            Some(pump) => {
                // Pump breaks out of its loop and drops the sink
                let _ = pump.stop.send(true);
                Ok(())
            }
            None => Err(GatewayError::Camera("no recording in progress".into())),
        }
    }

    fn close(&mut self) {
        if self.pump.is_some() {
            let _ = self.stop_recording();
        }
    }
}
