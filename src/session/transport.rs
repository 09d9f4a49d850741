//! Transport seam between the session loop and the wire protocols.

use crate::config::TargetConfig;
use crate::decoder::TelemetryPayload;
use crate::error::TelemetryError;
use async_trait::async_trait;

/// Opens connections to one kind of device endpoint.
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    type Stream: TelemetryStream;

    /// Establishes a connection. The session applies the target's timeout
    /// around this call.
    async fn connect(&self, target: &TargetConfig) -> Result<Self::Stream, TelemetryError>;
}

/// An established connection delivering telemetry payloads.
///
/// Dropping the stream closes the underlying transport.
#[async_trait]
pub trait TelemetryStream: Send + 'static {
    /// Sends the subscription request. Called exactly once per connection.
    async fn subscribe(&mut self) -> Result<(), TelemetryError>;

    /// Waits for the next payload. `Ok(None)` means the remote end closed
    /// the stream.
    async fn next_payload(&mut self) -> Result<Option<TelemetryPayload>, TelemetryError>;
}
