//! # Event Sinks
//!
//! Output side of the collector:
//! - [`EventSink`] receives every well-formed decoded event
//! - [`Diagnostics`] receives non-fatal anomalies found while decoding
//!
//! Both are shared by all session tasks and must be safe for concurrent use.

pub mod writer;

pub use writer::{EventLogConfig, EventLogStats, EventLogWriter, RotationPolicy};

use crate::error::TelemetryError;
use crate::types::Event;
use tokio::sync::mpsc;

/// Consumer of decoded events.
pub trait EventSink: Send + Sync {
    fn accept(&self, event: Event);
}

/// Consumer of decoding anomalies.
pub trait Diagnostics: Send + Sync {
    /// A top-level subtree other than `keys` / `content` was skipped.
    fn report_unexpected_field(&self, name: &str);

    /// A group decoded into an event that is not well formed, or could not be
    /// decoded at all.
    fn report_malformed_group(&self, reason: &str);
}

/// Hands the well-formed events to `sink` and reports the rest.
///
/// Returns the number of events delivered.
pub fn deliver(events: Vec<Event>, sink: &dyn EventSink, diagnostics: &dyn Diagnostics) -> u64 {
    let mut delivered = 0;
    for event in events {
        if let Some(reason) = event.malformed_reason() {
            diagnostics.report_malformed_group(&reason);
            continue;
        }
        sink.accept(event);
        delivered += 1;
    }
    delivered
}

/// Writes events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn accept(&self, event: Event) {
        log::info!(
            "Telemetry event {} @ {}: {} tags, {} fields",
            event.encoding_path,
            event.timestamp,
            event.tags.len(),
            event.fields.len()
        );
        log::debug!("Tags: {:?}", event.tags);
        log::debug!("Fields: {:?}", event.fields);
    }
}

/// Reports anomalies as log warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn report_unexpected_field(&self, name: &str) {
        log::warn!("{}", TelemetryError::UnexpectedField(name.to_string()));
    }

    fn report_malformed_group(&self, reason: &str) {
        log::warn!("Invalid telemetry group: {}", reason);
    }
}

/// Forwards events into a tokio channel.
///
/// Events are dropped (with a debug log) once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn accept(&self, event: Event) {
        if self.tx.send(event).is_err() {
            log::debug!("Event receiver dropped, discarding event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::timestamp_from_millis;

    #[tokio::test]
    async fn test_channel_sink_forwards_in_order() {
        let (sink, mut rx) = ChannelSink::new();
        sink.accept(Event::new(timestamp_from_millis(1), "first"));
        sink.accept(Event::new(timestamp_from_millis(2), "second"));

        assert_eq!(rx.recv().await.unwrap().encoding_path, "first");
        assert_eq!(rx.recv().await.unwrap().encoding_path, "second");
    }

    #[test]
    fn test_deliver_skips_ill_formed_events() {
        let (sink, mut rx) = ChannelSink::new();

        let mut good = Event::new(timestamp_from_millis(1), "path");
        good.tags.insert("Producer".into(), "r1".into());
        good.fields.insert("octets".into(), crate::types::TypedValue::Uint64(1));
        let bad = Event::new(timestamp_from_millis(2), "path");

        assert_eq!(deliver(vec![bad, good], &sink, &LogDiagnostics), 1);
        assert_eq!(rx.try_recv().unwrap().timestamp.timestamp_millis(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.accept(Event::new(timestamp_from_millis(1), "orphan"));
    }
}
