//! Camera stream session
//!
//! Owns the camera device and the single TCP video client. Accepts one
//! client at a time, starts the camera into the client socket, and watches
//! the recording for failures on the periodic health tick. The gateway never
//! reads from the client socket, so the health tick is the only path that
//! notices a dead client.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::camera::device::CameraDevice;
use crate::error::Result;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, not yet listening
    Idle,
    /// Listening, no client connected
    AwaitingClient,
    /// One client connected, camera recording into its socket
    Streaming,
}

/// The camera-side session of the gateway
pub struct CameraSession<C: CameraDevice> {
    camera: C,
    listener: Option<TcpListener>,
    state: SessionState,
    peer: Option<SocketAddr>,
}

impl<C: CameraDevice> CameraSession<C> {
    /// Create a session around a camera device. No sockets yet.
    pub fn new(camera: C) -> Self {
        Self {
            camera,
            listener: None,
            state: SessionState::Idle,
            peer: None,
        }
    }

    /// Bind the video listener and start awaiting a client
    pub async fn listen(&mut self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "Listening for camera connections");

        self.listener = Some(listener);
        self.state = SessionState::AwaitingClient;
        Ok(())
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Address of the connected client, while streaming
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Actual bound address of the video listener
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Whether the listener should be armed in the readiness set this pass.
    ///
    /// False while a client is connected, which is what keeps a second
    /// client parked in the accept backlog until the session ends.
    pub fn is_listening(&self) -> bool {
        self.state == SessionState::AwaitingClient && self.listener.is_some()
    }

    /// Accept the pending connection and start streaming into it.
    ///
    /// Only called when `is_listening` put the listener in the readiness
    /// set. A camera that refuses to start is a fatal error for the caller.
    pub async fn accept(&mut self) -> Result<()> {
        let listener = self
            .listener
            .as_ref()
            .expect("accept polled without a bound listener");

        let (socket, peer) = listener.accept().await?;
        tracing::info!(peer = %peer, "Camera client connected");

        self.camera.start_recording(socket)?;
        self.state = SessionState::Streaming;
        self.peer = Some(peer);
        Ok(())
    }

    /// Health check, run once per loop pass.
    ///
    /// No-op unless streaming. A recording error tears the session down and
    /// returns the listener to the readiness set.
    pub fn periodic_tick(&mut self) {
        if self.state != SessionState::Streaming {
            return;
        }

        if let Err(e) = self.camera.check_recording() {
            tracing::error!(error = %e, peer = ?self.peer, "Camera error");
            self.disconnect();
        }
    }

    /// Idempotent teardown, safe from any state including before `listen`
    pub fn close(&mut self) {
        if self.state == SessionState::Streaming {
            self.disconnect();
        }
        self.camera.close();
        self.listener = None;
        self.state = SessionState::Idle;
    }

    fn disconnect(&mut self) {
        tracing::info!(peer = ?self.peer, "Disconnecting camera client");

        // A secondary failure while stopping must not abort the teardown
        if let Err(e) = self.camera.stop_recording() {
            tracing::debug!(error = %e, "Stop recording failed during disconnect");
        }

        self.peer = None;
        self.state = SessionState::AwaitingClient;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpStream;

    use crate::error::GatewayError;

    /// Scriptable camera for session tests
    #[derive(Default)]
    struct MockState {
        recording: bool,
        starts: u32,
        stops: u32,
        closed: bool,
        fail_start: bool,
        check_error: Option<String>,
    }

    #[derive(Clone, Default)]
    struct MockCamera {
        state: Arc<Mutex<MockState>>,
    }

    impl CameraDevice for MockCamera {
        fn start_recording(&mut self, _sink: TcpStream) -> crate::error::Result<()> {
            let mut s = self.state.lock().unwrap();
            if s.fail_start {
                return Err(GatewayError::Camera("device unusable".into()));
            }
            s.recording = true;
            s.starts += 1;
            Ok(())
        }

        fn check_recording(&mut self) -> crate::error::Result<()> {
            let s = self.state.lock().unwrap();
            match &s.check_error {
                Some(e) => Err(GatewayError::Camera(e.clone())),
                None => Ok(()),
            }
        }

        fn stop_recording(&mut self) -> crate::error::Result<()> {
            let mut s = self.state.lock().unwrap();
            if !s.recording {
                return Err(GatewayError::Camera("no recording in progress".into()));
            }
            s.recording = false;
            s.stops += 1;
            Ok(())
        }

        fn close(&mut self) {
            let mut s = self.state.lock().unwrap();
            s.closed = true;
        }
    }

    async fn listening_session() -> (CameraSession<MockCamera>, MockCamera, SocketAddr) {
        let camera = MockCamera::default();
        let mut session = CameraSession::new(camera.clone());
        session.listen("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = session.local_addr().unwrap();
        (session, camera, addr)
    }

    #[tokio::test]
    async fn test_accept_transitions_to_streaming() {
        let (mut session, camera, addr) = listening_session().await;
        assert_eq!(session.state(), SessionState::AwaitingClient);
        assert!(session.is_listening());

        let _client = TcpStream::connect(addr).await.unwrap();
        session.accept().await.unwrap();

        assert_eq!(session.state(), SessionState::Streaming);
        assert!(!session.is_listening());
        assert!(session.peer().is_some());
        assert_eq!(camera.state.lock().unwrap().starts, 1);
    }

    #[tokio::test]
    async fn test_camera_fault_returns_to_listening() {
        let (mut session, camera, addr) = listening_session().await;
        let _client = TcpStream::connect(addr).await.unwrap();
        session.accept().await.unwrap();

        // Healthy tick changes nothing
        session.periodic_tick();
        assert_eq!(session.state(), SessionState::Streaming);

        camera.state.lock().unwrap().check_error = Some("encoder stalled".into());
        session.periodic_tick();

        assert_eq!(session.state(), SessionState::AwaitingClient);
        assert!(session.is_listening());
        assert!(session.peer().is_none());
        assert_eq!(camera.state.lock().unwrap().stops, 1);
    }

    #[tokio::test]
    async fn test_tick_is_noop_when_not_streaming() {
        let (mut session, camera, _addr) = listening_session().await;
        camera.state.lock().unwrap().check_error = Some("ignored".into());

        session.periodic_tick();
        assert_eq!(session.state(), SessionState::AwaitingClient);
        assert_eq!(camera.state.lock().unwrap().stops, 0);
    }

    #[tokio::test]
    async fn test_start_failure_propagates() {
        let (mut session, camera, addr) = listening_session().await;
        camera.state.lock().unwrap().fail_start = true;

        let _client = TcpStream::connect(addr).await.unwrap();
        let err = session.accept().await.unwrap_err();
        assert!(matches!(err, GatewayError::Camera(_)));
        assert_eq!(session.state(), SessionState::AwaitingClient);
    }

    #[tokio::test]
    async fn test_close_is_idempotent_from_any_state() {
        // Before listen
        let camera = MockCamera::default();
        let mut session = CameraSession::new(camera.clone());
        session.close();
        assert!(camera.state.lock().unwrap().closed);

        // While streaming
        let (mut session, camera, addr) = listening_session().await;
        let _client = TcpStream::connect(addr).await.unwrap();
        session.accept().await.unwrap();

        session.close();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.is_listening());
        assert_eq!(camera.state.lock().unwrap().stops, 1);
        assert!(camera.state.lock().unwrap().closed);

        session.close();
        assert_eq!(camera.state.lock().unwrap().stops, 1);
    }
}
