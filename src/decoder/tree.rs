//! Key/value tree decoder for self-describing MDT messages.
//!
//! Every top-level group carries a `keys` subtree (decoded into tags) and a
//! `content` subtree (decoded into fields). Nested nodes are named by the
//! `/`-joined names of their ancestors within the subtree, e.g. a leaf `b`
//! under `a` becomes `a/b`.

use super::rows::decode_rows;
use crate::proto::telemetry::Telemetry;
use crate::sink::Diagnostics;
use crate::types::{timestamp_from_millis, Event, MessageHeader, TelemetryField, TelemetryGroup, TypedValue};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub const PRODUCER_TAG: &str = "Producer";
pub const TARGET_TAG: &str = "Target";
pub const ENCODING_PATH_TAG: &str = "EncodingPath";
pub const TIMESTAMP_TAG: &str = "TimeStamp";

const KEYS: &str = "keys";
const CONTENT: &str = "content";

/// Output of one descent pass.
enum Destination<'a> {
    Tags(&'a mut HashMap<String, String>),
    Fields(&'a mut HashMap<String, TypedValue>),
}

/// Decodes one top-level group into an event.
///
/// The group timestamp wins over the message timestamp unless it is zero.
/// Subtrees other than `keys` and `content` are reported through
/// `diagnostics` and skipped. The returned event may be ill formed (see
/// [`Event::is_well_formed`]); reporting that is up to the caller.
pub fn decode_group(
    group: &TelemetryGroup,
    header: &MessageHeader,
    diagnostics: &dyn Diagnostics,
) -> Event {
    let measured = if group.timestamp != 0 {
        group.timestamp
    } else {
        header.msg_timestamp
    };
    let timestamp = timestamp_from_millis(measured);

    let mut event = Event::new(timestamp, header.encoding_path.clone());
    let mut namebuf = String::new();

    for subtree in &group.subtrees {
        match subtree.name.as_str() {
            KEYS => {
                let mut tags = HashMap::with_capacity(subtree.children.len() + 4);
                seed_header_tags(&mut tags, header, timestamp);
                let mut out = Destination::Tags(&mut tags);
                for child in &subtree.children {
                    descend(child, &mut namebuf, &mut out);
                }
                event.tags = tags;
            }
            CONTENT => {
                let mut fields = HashMap::with_capacity(subtree.children.len());
                let mut out = Destination::Fields(&mut fields);
                for child in &subtree.children {
                    descend(child, &mut namebuf, &mut out);
                }
                event.fields = fields;
            }
            other => diagnostics.report_unexpected_field(other),
        }
    }

    event
}

/// Decodes a whole MDT message: one event per key/value group, then one per
/// compact GPB row.
pub fn decode_message(message: Telemetry, diagnostics: &dyn Diagnostics) -> Vec<Event> {
    let header = MessageHeader::from(&message);

    let mut events: Vec<Event> = message
        .data_gpbkv
        .into_iter()
        .map(|field| decode_group(&TelemetryGroup::from(field), &header, diagnostics))
        .collect();

    if let Some(table) = message.data_gpb {
        events.extend(decode_rows(&table, &header));
    }

    events
}

/// Flattens a list of nodes into string tags.
pub fn decode_tags(nodes: &[TelemetryField]) -> HashMap<String, String> {
    let mut tags = HashMap::new();
    let mut namebuf = String::new();
    let mut out = Destination::Tags(&mut tags);
    for node in nodes {
        descend(node, &mut namebuf, &mut out);
    }
    tags
}

/// Flattens a list of nodes into typed fields.
pub fn decode_fields(nodes: &[TelemetryField]) -> HashMap<String, TypedValue> {
    let mut fields = HashMap::new();
    let mut namebuf = String::new();
    let mut out = Destination::Fields(&mut fields);
    for node in nodes {
        descend(node, &mut namebuf, &mut out);
    }
    fields
}

/// The four tags every MDT event carries.
pub(crate) fn seed_header_tags(
    tags: &mut HashMap<String, String>,
    header: &MessageHeader,
    timestamp: DateTime<Utc>,
) {
    tags.insert(PRODUCER_TAG.to_string(), header.node_id.clone());
    tags.insert(TARGET_TAG.to_string(), header.subscription_id.clone());
    tags.insert(ENCODING_PATH_TAG.to_string(), header.encoding_path.clone());
    tags.insert(TIMESTAMP_TAG.to_string(), timestamp.to_string());
}

/// Depth-first descent with a shared, backtracked name buffer.
fn descend(field: &TelemetryField, namebuf: &mut String, out: &mut Destination<'_>) {
    let namelen = namebuf.len();
    if namelen > 0 {
        namebuf.push('/');
    }
    namebuf.push_str(&field.name);

    if let Some(value) = &field.value {
        match out {
            Destination::Tags(tags) => {
                tags.insert(namebuf.clone(), value.to_string());
            }
            Destination::Fields(fields) => {
                fields.insert(namebuf.clone(), value.clone());
            }
        }
    }

    for child in &field.children {
        descend(child, namebuf, out);
    }

    namebuf.truncate(namelen);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::LogDiagnostics;

    #[test]
    fn test_siblings_do_not_inherit_each_others_names() {
        let nodes = vec![
            TelemetryField::node(
                "a",
                vec![
                    TelemetryField::leaf("x", TypedValue::Uint32(1)),
                    TelemetryField::node("b", vec![TelemetryField::leaf("y", TypedValue::Uint32(2))]),
                    TelemetryField::leaf("z", TypedValue::Uint32(3)),
                ],
            ),
            TelemetryField::leaf("top", TypedValue::Uint32(4)),
        ];

        let fields = decode_fields(&nodes);
        assert_eq!(fields.len(), 4);
        assert_eq!(fields["a/x"], TypedValue::Uint32(1));
        assert_eq!(fields["a/b/y"], TypedValue::Uint32(2));
        assert_eq!(fields["a/z"], TypedValue::Uint32(3));
        assert_eq!(fields["top"], TypedValue::Uint32(4));
    }

    #[test]
    fn test_node_with_value_and_children() {
        let nodes = vec![TelemetryField {
            name: "queue".into(),
            value: Some(TypedValue::String("q0".into())),
            children: vec![TelemetryField::leaf("depth", TypedValue::Uint64(12))],
        }];

        let tags = decode_tags(&nodes);
        assert_eq!(tags["queue"], "q0");
        assert_eq!(tags["queue/depth"], "12");
    }

    #[test]
    fn test_empty_node_contributes_nothing() {
        let nodes = vec![TelemetryField::node("empty", Vec::new())];
        assert!(decode_fields(&nodes).is_empty());
    }

    #[test]
    fn test_group_timestamp_overrides_message_timestamp() {
        let header = MessageHeader {
            node_id: "r1".into(),
            subscription_id: "sub".into(),
            encoding_path: "path".into(),
            msg_timestamp: 5_000,
        };
        let group = TelemetryGroup {
            timestamp: 7_250,
            subtrees: Vec::new(),
        };

        let event = decode_group(&group, &header, &LogDiagnostics);
        assert_eq!(event.timestamp.timestamp_millis(), 7_250);

        let fallback = decode_group(&TelemetryGroup::default(), &header, &LogDiagnostics);
        assert_eq!(fallback.timestamp.timestamp_millis(), 5_000);
    }
}
