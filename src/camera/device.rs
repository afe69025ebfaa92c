//! Camera device seam
//!
//! Capture and encoding live behind this trait. The gateway only tells the
//! device where to push bytes, polls it for recording errors, and tells it to
//! stop; it never touches the video data itself.

use tokio::net::TcpStream;

use crate::error::Result;

/// A camera producing an opaque encoded byte stream.
///
/// The device takes ownership of the sink on `start_recording` and pushes
/// into it until stopped or until the sink dies. All methods are expected to
/// return quickly; recording itself happens on whatever internal pump the
/// device runs.
pub trait CameraDevice: Send {
    /// Start pushing the encoded stream into `sink`.
    ///
    /// Fails if a recording is already in progress or the device is unusable.
    fn start_recording(&mut self, sink: TcpStream) -> Result<()>;

    /// Non-blocking poll for a recording failure.
    ///
    /// Returns the error the pump hit since the last start, if any. A device
    /// that is not recording reports no error.
    fn check_recording(&mut self) -> Result<()>;

    /// Stop the current recording and release the sink.
    ///
    /// Fails if no recording is in progress.
    fn stop_recording(&mut self) -> Result<()>;

    /// Release the device. Idempotent; stops any recording still running.
    fn close(&mut self);
}
