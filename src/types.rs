//! Core data model: typed value trees, decoded events and time helpers.

use crate::proto::telemetry as mdt;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall clock in milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Converts a device timestamp in milliseconds since the epoch to an instant.
///
/// Sub-millisecond precision is zero-filled. Values outside the representable
/// range collapse to the epoch.
pub fn timestamp_from_millis(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

/// Converts a gNMI timestamp (nanoseconds since the epoch) to an instant.
pub fn timestamp_from_nanos(ns: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(ns)
}

// ================================================================================================
// TYPED VALUES
// ================================================================================================

/// A scalar carried by a telemetry tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Bytes(Vec<u8>),
    String(String),
    Bool(bool),
    Uint32(u32),
    Uint64(u64),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Float(f32),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Bytes(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            TypedValue::String(s) => f.write_str(s),
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Uint32(v) => write!(f, "{}", v),
            TypedValue::Uint64(v) => write!(f, "{}", v),
            TypedValue::Int32(v) => write!(f, "{}", v),
            TypedValue::Int64(v) => write!(f, "{}", v),
            TypedValue::Double(v) => write!(f, "{}", v),
            TypedValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<mdt::telemetry_field::ValueByType> for TypedValue {
    fn from(value: mdt::telemetry_field::ValueByType) -> Self {
        use mdt::telemetry_field::ValueByType;

        match value {
            ValueByType::BytesValue(v) => TypedValue::Bytes(v),
            ValueByType::StringValue(v) => TypedValue::String(v),
            ValueByType::BoolValue(v) => TypedValue::Bool(v),
            ValueByType::Uint32Value(v) => TypedValue::Uint32(v),
            ValueByType::Uint64Value(v) => TypedValue::Uint64(v),
            ValueByType::Sint32Value(v) => TypedValue::Int32(v),
            ValueByType::Sint64Value(v) => TypedValue::Int64(v),
            ValueByType::DoubleValue(v) => TypedValue::Double(v),
            ValueByType::FloatValue(v) => TypedValue::Float(v),
        }
    }
}

// ================================================================================================
// VALUE TREES
// ================================================================================================

/// One node of a self-describing key/value tree.
///
/// A node may carry a value, children, both or neither.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryField {
    pub name: String,
    pub value: Option<TypedValue>,
    pub children: Vec<TelemetryField>,
}

impl TelemetryField {
    /// Leaf node carrying a value.
    pub fn leaf(name: impl Into<String>, value: TypedValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            children: Vec::new(),
        }
    }

    /// Interior node without a value.
    pub fn node(name: impl Into<String>, children: Vec<TelemetryField>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children,
        }
    }
}

impl From<mdt::TelemetryField> for TelemetryField {
    fn from(field: mdt::TelemetryField) -> Self {
        TelemetryField {
            name: field.name,
            value: field.value_by_type.map(TypedValue::from),
            children: field.fields.into_iter().map(TelemetryField::from).collect(),
        }
    }
}

/// A top-level grouping of one message: optional timestamp plus named subtrees.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TelemetryGroup {
    /// Milliseconds since the epoch, 0 when unset
    pub timestamp: u64,
    /// Conventionally `keys` and `content`
    pub subtrees: Vec<TelemetryField>,
}

impl From<mdt::TelemetryField> for TelemetryGroup {
    fn from(field: mdt::TelemetryField) -> Self {
        TelemetryGroup {
            timestamp: field.timestamp,
            subtrees: field.fields.into_iter().map(TelemetryField::from).collect(),
        }
    }
}

/// Message-level metadata shared by every group of one MDT message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageHeader {
    pub node_id: String,
    pub subscription_id: String,
    pub encoding_path: String,
    /// Milliseconds since the epoch
    pub msg_timestamp: u64,
}

impl From<&mdt::Telemetry> for MessageHeader {
    fn from(message: &mdt::Telemetry) -> Self {
        MessageHeader {
            node_id: message.node_id_str.clone(),
            subscription_id: message.subscription_id_str.clone(),
            encoding_path: message.encoding_path.clone(),
            msg_timestamp: message.msg_timestamp,
        }
    }
}

// ================================================================================================
// EVENTS
// ================================================================================================

/// A flat observation record handed to the sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub tags: HashMap<String, String>,
    pub fields: HashMap<String, TypedValue>,
    pub encoding_path: String,
}

impl Event {
    pub fn new(timestamp: DateTime<Utc>, encoding_path: impl Into<String>) -> Self {
        Event {
            timestamp,
            tags: HashMap::new(),
            fields: HashMap::new(),
            encoding_path: encoding_path.into(),
        }
    }

    /// An event is usable downstream only with tags, fields and an encoding path.
    pub fn is_well_formed(&self) -> bool {
        !self.fields.is_empty() && !self.tags.is_empty() && !self.encoding_path.is_empty()
    }

    /// Describes why the event is not well formed, if it is not.
    pub fn malformed_reason(&self) -> Option<String> {
        let mut missing = Vec::new();
        if self.encoding_path.is_empty() {
            missing.push("encoding path");
        }
        if self.tags.is_empty() {
            missing.push("tags");
        }
        if self.fields.is_empty() {
            missing.push("fields");
        }
        if missing.is_empty() {
            None
        } else {
            Some(format!("empty {}", missing.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_from_millis_zero_fills() {
        let ts = timestamp_from_millis(1_500);
        assert_eq!(ts.timestamp(), 1);
        assert_eq!(ts.timestamp_subsec_nanos(), 500_000_000);
    }

    #[test]
    fn test_timestamp_out_of_range_is_epoch() {
        assert_eq!(timestamp_from_millis(u64::MAX).timestamp(), 0);
    }

    #[test]
    fn test_typed_value_rendering() {
        assert_eq!(TypedValue::Bool(true).to_string(), "true");
        assert_eq!(TypedValue::Int32(-7).to_string(), "-7");
        assert_eq!(TypedValue::Bytes(vec![0x0a, 0xff]).to_string(), "0aff");
        assert_eq!(TypedValue::String("eth0/0".into()).to_string(), "eth0/0");
    }

    #[test]
    fn test_field_conversion_keeps_tree() {
        let wire = mdt::TelemetryField {
            name: "a".into(),
            fields: vec![mdt::TelemetryField {
                name: "b".into(),
                value_by_type: Some(mdt::telemetry_field::ValueByType::Sint64Value(-3)),
                ..Default::default()
            }],
            ..Default::default()
        };

        let field = TelemetryField::from(wire);
        assert_eq!(field.name, "a");
        assert!(field.value.is_none());
        assert_eq!(field.children[0].value, Some(TypedValue::Int64(-3)));
    }

    #[test]
    fn test_malformed_reason() {
        let mut event = Event::new(timestamp_from_millis(0), "");
        assert_eq!(
            event.malformed_reason().as_deref(),
            Some("empty encoding path, tags, fields")
        );

        event.encoding_path = "Cisco-IOS-XR-infra-statsd-oper".into();
        event.tags.insert("Producer".into(), "r1".into());
        event.fields.insert("octets".into(), TypedValue::Uint64(1));
        assert!(event.is_well_formed());
        assert!(event.malformed_reason().is_none());
    }
}
