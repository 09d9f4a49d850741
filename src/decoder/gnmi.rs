//! gNMI notification decoder.

use crate::path::{field_name, flatten, flatten_with_prefix, StructuredPath};
use crate::proto::gnmi::{subscribe_response, typed_value, Decimal64, SubscribeResponse};
use crate::sink::Diagnostics;
use crate::types::{timestamp_from_nanos, Event, TypedValue};
use std::collections::HashMap;
use std::net::SocketAddr;

pub const SOURCE_TAG: &str = "source";
pub const PATH_TAG: &str = "path";

/// Decodes one subscribe response.
///
/// Only `update` responses carry data; sync and error responses yield no
/// event. The returned event may be ill formed (e.g. a notification whose
/// updates carried no values).
pub fn decode_subscribe_response(
    address: &str,
    response: &SubscribeResponse,
    diagnostics: &dyn Diagnostics,
) -> Vec<Event> {
    let notification = match &response.response {
        Some(subscribe_response::Response::Update(notification)) => notification,
        Some(subscribe_response::Response::Error(err)) => {
            log::warn!("gNMI error from {}: {} ({})", address, err.message, err.code);
            return Vec::new();
        }
        _ => return Vec::new(),
    };

    let mut tags = HashMap::new();
    let prefix = notification
        .prefix
        .as_ref()
        .map(|p| flatten(&StructuredPath::from(p), &mut tags))
        .unwrap_or_default();
    tags.insert(SOURCE_TAG.to_string(), host_of(address));
    tags.insert(PATH_TAG.to_string(), prefix.clone());

    let mut event = Event::new(timestamp_from_nanos(notification.timestamp), prefix.clone());
    event.tags = tags;

    for update in &notification.update {
        let path = update
            .path
            .as_ref()
            .map(StructuredPath::from)
            .unwrap_or_default();
        let display = flatten_with_prefix(&prefix, &path, &mut event.tags);

        if event.encoding_path.is_empty() {
            event.encoding_path = display.clone();
        }

        let name = field_name(&display);
        match update.val.as_ref().and_then(|v| v.value.as_ref()) {
            Some(typed_value::Value::JsonVal(raw)) | Some(typed_value::Value::JsonIetfVal(raw)) => {
                match serde_json::from_slice::<serde_json::Value>(raw) {
                    Ok(json) => flatten_json(&name, &json, &mut event.fields),
                    Err(e) => diagnostics
                        .report_malformed_group(&format!("invalid JSON value at {}: {}", display, e)),
                }
            }
            Some(value) => {
                event.fields.insert(name, scalar(value));
            }
            None => log::debug!("gNMI update without value at {}", display),
        }
    }

    vec![event]
}

fn scalar(value: &typed_value::Value) -> TypedValue {
    use typed_value::Value;

    match value {
        Value::StringVal(s) | Value::AsciiVal(s) => TypedValue::String(s.clone()),
        Value::IntVal(v) => TypedValue::Int64(*v),
        Value::UintVal(v) => TypedValue::Uint64(*v),
        Value::BoolVal(v) => TypedValue::Bool(*v),
        Value::BytesVal(b) | Value::ProtoBytes(b) => TypedValue::Bytes(b.clone()),
        Value::FloatVal(v) => TypedValue::Float(*v),
        Value::DoubleVal(v) => TypedValue::Double(*v),
        Value::DecimalVal(d) => TypedValue::Double(decimal_to_f64(d)),
        // Handled by the caller, kept as raw text if it ever gets here
        Value::JsonVal(b) | Value::JsonIetfVal(b) => {
            TypedValue::String(String::from_utf8_lossy(b).into_owned())
        }
    }
}

fn decimal_to_f64(d: &Decimal64) -> f64 {
    d.digits as f64 / 10f64.powi(d.precision as i32)
}

fn flatten_json(name: &str, value: &serde_json::Value, fields: &mut HashMap<String, TypedValue>) {
    use serde_json::Value;

    match value {
        Value::Null => {}
        Value::Bool(b) => {
            fields.insert(name.to_string(), TypedValue::Bool(*b));
        }
        Value::Number(n) => {
            let typed = if let Some(u) = n.as_u64() {
                TypedValue::Uint64(u)
            } else if let Some(i) = n.as_i64() {
                TypedValue::Int64(i)
            } else {
                TypedValue::Double(n.as_f64().unwrap_or_default())
            };
            fields.insert(name.to_string(), typed);
        }
        Value::String(s) => {
            fields.insert(name.to_string(), TypedValue::String(s.clone()));
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_json(&format!("{}/{}", name, i), item, fields);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten_json(&format!("{}/{}", name, field_name(key)), item, fields);
            }
        }
    }
}

/// Host part of `host:port`, or the address unchanged when it has no port.
fn host_of(address: &str) -> String {
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    if let Some((host, port)) = address.rsplit_once(':') {
        if port.parse::<u16>().is_ok() {
            if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
                return inner.to_string();
            }
            // A bare IPv6 address has colons but no port
            if !host.contains(':') {
                return host.to_string();
            }
        }
    }
    address.trim_start_matches('[').trim_end_matches(']').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::gnmi::{Notification, Path, PathElem, TypedValue as WireValue, Update};
    use crate::sink::LogDiagnostics;

    fn elem(name: &str) -> PathElem {
        PathElem {
            name: name.into(),
            key: HashMap::new(),
        }
    }

    fn update(path: Vec<PathElem>, value: typed_value::Value) -> Update {
        Update {
            path: Some(Path {
                elem: path,
                ..Default::default()
            }),
            val: Some(WireValue { value: Some(value) }),
            duplicates: 0,
        }
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("10.1.1.1:57400"), "10.1.1.1");
        assert_eq!(host_of("[2001:db8::1]:57400"), "2001:db8::1");
        assert_eq!(host_of("router1:57400"), "router1");
        assert_eq!(host_of("router1"), "router1");
    }

    #[test]
    fn test_host_of_bare_ipv6_keeps_address() {
        assert_eq!(host_of("2001:db8::1"), "2001:db8::1");
        assert_eq!(host_of("fe80::1:2"), "fe80::1:2");
        assert_eq!(host_of("[2001:db8::1]"), "2001:db8::1");
        assert_eq!(host_of("[fe80::1%eth0]:57400"), "fe80::1%eth0");
    }

    #[test]
    fn test_decimal_conversion() {
        let d = Decimal64 {
            digits: 12345,
            precision: 2,
        };
        assert!((decimal_to_f64(&d) - 123.45).abs() < 1e-9);
    }

    #[test]
    fn test_json_value_is_flattened() {
        let json = br#"{"in-octets": 10, "oper-status": "UP", "errors": [1, -2], "ratio": 0.5}"#;
        let response = SubscribeResponse {
            response: Some(subscribe_response::Response::Update(Notification {
                timestamp: 1_000_000_000,
                prefix: None,
                update: vec![update(
                    vec![elem("counters")],
                    typed_value::Value::JsonIetfVal(json.to_vec()),
                )],
                ..Default::default()
            })),
        };

        let events = decode_subscribe_response("r1:57400", &response, &LogDiagnostics);
        let fields = &events[0].fields;
        assert_eq!(fields["/counters/in_octets"], TypedValue::Uint64(10));
        assert_eq!(fields["/counters/oper_status"], TypedValue::String("UP".into()));
        assert_eq!(fields["/counters/errors/1"], TypedValue::Int64(-2));
        assert_eq!(fields["/counters/ratio"], TypedValue::Double(0.5));
        assert_eq!(events[0].encoding_path, "/counters");
    }

    #[test]
    fn test_sync_response_yields_nothing() {
        let response = SubscribeResponse {
            response: Some(subscribe_response::Response::SyncResponse(true)),
        };
        assert!(decode_subscribe_response("r1:57400", &response, &LogDiagnostics).is_empty());
    }
}
