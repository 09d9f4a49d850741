//! # Telemetry Collector
//!
//! Streaming model-driven telemetry collection for network devices.
//!
//! ## Layout
//!
//! - [`path`]: XPath-like path parsing and flattening into tags
//! - [`decoder`]: MDT key/value trees, compact GPB rows and gNMI notifications
//!   into flat [`Event`]s
//! - [`session`]: per-target subscription sessions with redial and
//!   cooperative cancellation
//! - [`transport`]: gNMI, MDT dial-in and MDT dial-out gRPC adapters
//! - [`sink`]: event and diagnostics consumers, including a rotating
//!   JSON-lines event log
//!
//! Decoding is pure and shared by all transports.

pub mod config;
pub mod decoder;
pub mod error;
pub mod path;
pub mod proto;
pub mod session;
pub mod sink;
pub mod subscription;
pub mod transport;
pub mod types;

pub use config::{CollectorConfig, DialInProtocol, TargetConfig};
pub use decoder::{decode_payload, TelemetryPayload};
pub use error::TelemetryError;
pub use path::{PathElement, StructuredPath};
pub use session::{Dialer, Session, SessionManager, SessionState, TelemetryStream};
pub use sink::{ChannelSink, Diagnostics, EventSink, LogDiagnostics, LogSink};
pub use types::{Event, TelemetryField, TelemetryGroup, TypedValue};
