//! Per-target subscription sessions.
//!
//! A [`SessionManager`] runs one task per configured target. Each task
//! connects through a [`Dialer`], subscribes, decodes every payload and
//! hands the events to the shared sink, redialing after a fixed interval
//! until the shared cancellation token fires.

pub mod manager;
pub mod state;
pub mod transport;

pub use manager::SessionManager;
pub use state::{Session, SessionState, SessionStats};
pub use transport::{Dialer, TelemetryStream};
