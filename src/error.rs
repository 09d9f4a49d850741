//! Error taxonomy shared by the path codec, the decoders and the session loop.
//!
//! Propagation policy:
//! - decode errors (`MalformedPath` on incoming data, `Unmarshal`,
//!   `UnexpectedField`) drop the unit of work and the session continues
//! - `Transport` / `EndOfStream` end the current receive loop and trigger a redial
//! - `Config` is returned synchronously before any connection is attempted

/// Errors produced by the collector.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A path string could not be parsed.
    #[error("malformed path: {0}")]
    MalformedPath(String),

    /// A payload could not be decoded as the expected message shape.
    #[error("failed to unmarshal telemetry payload: {0}")]
    Unmarshal(String),

    /// A top-level group carried a subtree other than `keys` / `content`.
    #[error("unexpected top-level field: {0}")]
    UnexpectedField(String),

    /// The transport failed while connecting, subscribing or receiving.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote end closed the stream.
    #[error("end of stream")]
    EndOfStream,

    /// Invalid subscription or collector configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TelemetryError {
    /// Returns true for errors that end a receive loop and lead to a redial.
    pub fn is_transport(&self) -> bool {
        matches!(self, TelemetryError::Transport(_) | TelemetryError::EndOfStream)
    }
}

impl From<prost::DecodeError> for TelemetryError {
    fn from(err: prost::DecodeError) -> Self {
        TelemetryError::Unmarshal(err.to_string())
    }
}

impl From<tonic::Status> for TelemetryError {
    fn from(status: tonic::Status) -> Self {
        TelemetryError::Transport(format!("{}: {}", status.code(), status.message()))
    }
}

impl From<tonic::transport::Error> for TelemetryError {
    fn from(err: tonic::transport::Error) -> Self {
        TelemetryError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_classification() {
        assert!(TelemetryError::EndOfStream.is_transport());
        assert!(TelemetryError::Transport("reset".into()).is_transport());
        assert!(!TelemetryError::Config("bad mode".into()).is_transport());
        assert!(!TelemetryError::MalformedPath("a/b".into()).is_transport());
    }

    #[test]
    fn test_status_maps_to_transport() {
        let err: TelemetryError = tonic::Status::unavailable("device gone").into();
        assert!(err.is_transport());
        assert!(err.to_string().contains("device gone"));
    }
}
