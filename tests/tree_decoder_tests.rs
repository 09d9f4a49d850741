//! Integration tests for the key/value tree decoder.
//!
//! Tests verify:
//! - Tag and field extraction from `keys` / `content` subtrees
//! - Header tags and timestamp rendering
//! - Reporting of unexpected subtrees and ill-formed events
//! - Full MDT message decoding from wire bytes

use collector::decoder::tree::{ENCODING_PATH_TAG, PRODUCER_TAG, TARGET_TAG, TIMESTAMP_TAG};
use collector::decoder::{decode_fields, decode_group, decode_payload, decode_tags, TelemetryPayload};
use collector::proto::telemetry as mdt;
use collector::types::{timestamp_from_millis, MessageHeader};
use collector::{Diagnostics, TelemetryField, TelemetryGroup, TypedValue};
use parking_lot::Mutex;
use prost::Message;

/// Records every report for later inspection.
#[derive(Default)]
struct RecordingDiagnostics {
    unexpected: Mutex<Vec<String>>,
    malformed: Mutex<Vec<String>>,
}

impl Diagnostics for RecordingDiagnostics {
    fn report_unexpected_field(&self, name: &str) {
        self.unexpected.lock().push(name.to_string());
    }

    fn report_malformed_group(&self, reason: &str) {
        self.malformed.lock().push(reason.to_string());
    }
}

fn header() -> MessageHeader {
    MessageHeader {
        node_id: "xr-1".into(),
        subscription_id: "Sub1".into(),
        encoding_path: "Cisco-IOS-XR-infra-statsd-oper:infra-statistics/interfaces/interface/latest/generic-counters".into(),
        msg_timestamp: 0,
    }
}

fn interface_group(timestamp: u64) -> TelemetryGroup {
    TelemetryGroup {
        timestamp,
        subtrees: vec![
            TelemetryField::node(
                "keys",
                vec![TelemetryField::leaf("ifName", TypedValue::String("eth0/0".into()))],
            ),
            TelemetryField::node(
                "content",
                vec![TelemetryField::leaf("octets", TypedValue::Uint64(12345))],
            ),
        ],
    }
}

// ============================================================================
// GROUP DECODING
// ============================================================================

#[test]
fn test_keys_and_content_become_tags_and_fields() {
    let diagnostics = RecordingDiagnostics::default();
    let event = decode_group(&interface_group(1000), &header(), &diagnostics);

    assert_eq!(event.tags["ifName"], "eth0/0");
    assert_eq!(event.tags[TIMESTAMP_TAG], timestamp_from_millis(1000).to_string());
    assert_eq!(event.tags[TIMESTAMP_TAG], "1970-01-01 00:00:01 UTC");
    assert_eq!(event.fields["octets"], TypedValue::Uint64(12345));

    assert_eq!(event.timestamp.timestamp(), 1);
    assert_eq!(event.timestamp.timestamp_subsec_millis(), 0);
    assert!(event.is_well_formed());
    assert!(diagnostics.unexpected.lock().is_empty());
}

#[test]
fn test_header_tags_are_seeded() {
    let event = decode_group(&interface_group(1000), &header(), &RecordingDiagnostics::default());

    assert_eq!(event.tags[PRODUCER_TAG], "xr-1");
    assert_eq!(event.tags[TARGET_TAG], "Sub1");
    assert_eq!(event.tags[ENCODING_PATH_TAG], header().encoding_path);
    assert_eq!(event.encoding_path, header().encoding_path);
    assert_eq!(event.tags.len(), 5);
}

#[test]
fn test_nested_value_is_typed_in_fields_and_text_in_tags() {
    let nodes = vec![TelemetryField::node(
        "a",
        vec![TelemetryField::leaf("b", TypedValue::Bool(true))],
    )];

    let fields = decode_fields(&nodes);
    assert_eq!(fields.len(), 1);
    assert_eq!(fields["a/b"], TypedValue::Bool(true));

    let tags = decode_tags(&nodes);
    assert_eq!(tags.len(), 1);
    assert_eq!(tags["a/b"], "true");
}

#[test]
fn test_unexpected_subtree_reported_once_and_ignored() {
    let diagnostics = RecordingDiagnostics::default();
    let mut group = interface_group(1000);
    group.subtrees.push(TelemetryField::node(
        "extra",
        vec![TelemetryField::leaf("x", TypedValue::Uint32(1))],
    ));

    let event = decode_group(&group, &header(), &diagnostics);

    assert_eq!(*diagnostics.unexpected.lock(), vec!["extra".to_string()]);
    assert_eq!(event.fields.len(), 1);
    assert_eq!(event.tags.len(), 5);
    assert!(!event.fields.contains_key("x"));
    assert!(!event.tags.contains_key("x"));
}

#[test]
fn test_event_without_fields_is_returned_but_ill_formed() {
    let group = TelemetryGroup {
        timestamp: 1000,
        subtrees: vec![TelemetryField::node(
            "keys",
            vec![TelemetryField::leaf("ifName", TypedValue::String("eth0/0".into()))],
        )],
    };

    let event = decode_group(&group, &header(), &RecordingDiagnostics::default());

    assert!(event.fields.is_empty());
    assert!(!event.is_well_formed());
    assert_eq!(event.malformed_reason().as_deref(), Some("empty fields"));
}

#[test]
fn test_no_keys_subtree_means_no_header_tags() {
    let group = TelemetryGroup {
        timestamp: 1000,
        subtrees: vec![TelemetryField::node(
            "content",
            vec![TelemetryField::leaf("octets", TypedValue::Uint64(1))],
        )],
    };

    let event = decode_group(&group, &header(), &RecordingDiagnostics::default());
    assert!(event.tags.is_empty());
    assert!(!event.is_well_formed());
}

// ============================================================================
// WIRE MESSAGES
// ============================================================================

fn wire_leaf(name: &str, value: mdt::telemetry_field::ValueByType) -> mdt::TelemetryField {
    mdt::TelemetryField {
        name: name.into(),
        value_by_type: Some(value),
        ..Default::default()
    }
}

fn wire_node(name: &str, fields: Vec<mdt::TelemetryField>) -> mdt::TelemetryField {
    mdt::TelemetryField {
        name: name.into(),
        fields,
        ..Default::default()
    }
}

#[test]
fn test_decode_wire_message_with_multiple_groups() {
    use mdt::telemetry_field::ValueByType;

    let group = |ifname: &str, octets: u64, ts: u64| mdt::TelemetryField {
        timestamp: ts,
        fields: vec![
            wire_node("keys", vec![wire_leaf("interface-name", ValueByType::StringValue(ifname.into()))]),
            wire_node(
                "content",
                vec![
                    wire_leaf("bytes-received", ValueByType::Uint64Value(octets)),
                    wire_node("rates", vec![wire_leaf("input-load", ValueByType::Uint32Value(3))]),
                ],
            ),
        ],
        ..Default::default()
    };

    let message = mdt::Telemetry {
        node_id_str: "xr-1".into(),
        subscription_id_str: "Sub1".into(),
        encoding_path: "Cisco-IOS-XR-infra-statsd-oper:infra-statistics".into(),
        msg_timestamp: 9_000,
        data_gpbkv: vec![group("Gi0/0/0/0", 100, 8_000), group("Gi0/0/0/1", 200, 0)],
        ..Default::default()
    };

    let diagnostics = RecordingDiagnostics::default();
    let events = decode_payload(
        "10.0.0.1:57500",
        TelemetryPayload::Mdt(message.encode_to_vec()),
        &diagnostics,
    )
    .unwrap();

    assert_eq!(events.len(), 2);

    // Names are not rewritten by the tree decoder
    assert_eq!(events[0].tags["interface-name"], "Gi0/0/0/0");
    assert_eq!(events[0].fields["bytes-received"], TypedValue::Uint64(100));
    assert_eq!(events[0].fields["rates/input-load"], TypedValue::Uint32(3));
    assert_eq!(events[0].timestamp.timestamp_millis(), 8_000);

    assert_eq!(events[1].tags["interface-name"], "Gi0/0/0/1");
    assert_eq!(events[1].timestamp.timestamp_millis(), 9_000);

    assert!(events.iter().all(|e| e.is_well_formed()));
    assert!(diagnostics.unexpected.lock().is_empty());
}
