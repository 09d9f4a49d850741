//! Compact GPB rows.
//!
//! Rows are schema-specific protobuf blobs. Without the schema the collector
//! forwards them untouched: `content` (and `keys` when present) become byte
//! fields, the message header becomes tags.

use super::tree::seed_header_tags;
use crate::proto::telemetry::TelemetryGpbTable;
use crate::types::{timestamp_from_millis, Event, MessageHeader, TypedValue};

pub const CONTENT_FIELD: &str = "content";
pub const KEYS_FIELD: &str = "keys";

/// One event per row. A row timestamp of zero falls back to the message
/// timestamp.
pub fn decode_rows(table: &TelemetryGpbTable, header: &MessageHeader) -> Vec<Event> {
    table
        .row
        .iter()
        .map(|row| {
            let measured = if row.timestamp != 0 {
                row.timestamp
            } else {
                header.msg_timestamp
            };
            let timestamp = timestamp_from_millis(measured);

            let mut event = Event::new(timestamp, header.encoding_path.clone());
            seed_header_tags(&mut event.tags, header, timestamp);

            if !row.content.is_empty() {
                event
                    .fields
                    .insert(CONTENT_FIELD.to_string(), TypedValue::Bytes(row.content.clone()));
            }
            if !row.keys.is_empty() {
                event
                    .fields
                    .insert(KEYS_FIELD.to_string(), TypedValue::Bytes(row.keys.clone()));
            }

            event
        })
        .collect()
}
