//! Gateway error types

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Error type for gateway operations
#[derive(Debug)]
pub enum GatewayError {
    /// Socket-level failure (bind, accept, receive, send)
    Io(std::io::Error),
    /// Failure reported by the camera device
    Camera(String),
    /// Datagram payload was not valid UTF-8
    Payload(std::str::Utf8Error),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::Io(e) => write!(f, "I/O error: {}", e),
            GatewayError::Camera(msg) => write!(f, "Camera error: {}", msg),
            GatewayError::Payload(e) => write!(f, "Invalid datagram payload: {}", e),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Io(e) => Some(e),
            GatewayError::Camera(_) => None,
            GatewayError::Payload(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(e: std::io::Error) -> Self {
        GatewayError::Io(e)
    }
}

impl From<std::str::Utf8Error> for GatewayError {
    fn from(e: std::str::Utf8Error) -> Self {
        GatewayError::Payload(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = GatewayError::Camera("recording stalled".into());
        assert_eq!(err.to_string(), "Camera error: recording stalled");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe");
        let err: GatewayError = io.into();
        assert!(matches!(err, GatewayError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
