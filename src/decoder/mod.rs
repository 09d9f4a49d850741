//! Telemetry decoders.
//!
//! - [`tree`]: self-describing key/value trees (MDT GPB-KV) into tags and fields
//! - [`rows`]: compact GPB rows, passed through as raw content
//! - [`gnmi`]: gNMI notifications
//!
//! All decoders are pure: each call owns its path buffer and output maps.

pub mod gnmi;
pub mod rows;
pub mod tree;

pub use gnmi::decode_subscribe_response;
pub use rows::decode_rows;
pub use tree::{decode_fields, decode_group, decode_message, decode_tags};

use crate::error::TelemetryError;
use crate::proto::gnmi::SubscribeResponse;
use crate::proto::telemetry::Telemetry;
use crate::sink::Diagnostics;
use crate::types::Event;
use prost::Message;

/// One message as delivered by a transport adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryPayload {
    /// Opaque binary MDT `Telemetry` message
    Mdt(Vec<u8>),
    /// Already-parsed gNMI subscribe response
    Gnmi(SubscribeResponse),
}

/// Decodes one payload into events.
///
/// `source` is the address of the device the payload came from.
///
/// # Errors
/// `Unmarshal` when an MDT payload is not a valid `Telemetry` message. The
/// caller drops the payload and keeps the session alive.
pub fn decode_payload(
    source: &str,
    payload: TelemetryPayload,
    diagnostics: &dyn Diagnostics,
) -> Result<Vec<Event>, TelemetryError> {
    match payload {
        TelemetryPayload::Mdt(bytes) => {
            let message = Telemetry::decode(bytes.as_slice())?;
            Ok(decode_message(message, diagnostics))
        }
        TelemetryPayload::Gnmi(response) => {
            Ok(decode_subscribe_response(source, &response, diagnostics))
        }
    }
}
