//! Subscription request builders for the dial-in transports.

use crate::config::{GnmiConfig, MdtConfig, SubscriptionConfig};
use crate::error::TelemetryError;
use crate::path;
use crate::proto::ems::CreateSubsArgs;
use crate::proto::gnmi::{
    subscribe_request, subscription_list, Encoding, Path, SubscribeRequest, Subscription,
    SubscriptionList, SubscriptionMode,
};

/// How often a path is streamed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// A single snapshot, then the device closes the stream
    Once,
    Sample,
    OnChange,
    TargetDefined,
}

impl StreamMode {
    /// Accepts `once`, `sample`, `on_change` / `on-change` and
    /// `target_defined` / `target-defined`, case-insensitively.
    pub fn parse(mode: &str) -> Result<Self, TelemetryError> {
        match mode.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "once" => Ok(StreamMode::Once),
            "sample" => Ok(StreamMode::Sample),
            "on_change" => Ok(StreamMode::OnChange),
            "target_defined" => Ok(StreamMode::TargetDefined),
            _ => Err(TelemetryError::Config(format!(
                "invalid subscription mode {}",
                mode
            ))),
        }
    }

    fn wire_mode(self) -> SubscriptionMode {
        match self {
            StreamMode::Sample => SubscriptionMode::Sample,
            StreamMode::OnChange => SubscriptionMode::OnChange,
            StreamMode::Once | StreamMode::TargetDefined => SubscriptionMode::TargetDefined,
        }
    }
}

/// MDT dial-in payload encodings as numbered by IOS XR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i64)]
pub enum MdtEncoding {
    Gpb = 2,
    GpbKv = 3,
    Json = 4,
}

impl MdtEncoding {
    pub fn parse(encoding: &str) -> Result<Self, TelemetryError> {
        match encoding.trim().to_ascii_lowercase().as_str() {
            "gpb" => Ok(MdtEncoding::Gpb),
            "gpbkv" | "kvgpb" => Ok(MdtEncoding::GpbKv),
            "json" => Ok(MdtEncoding::Json),
            _ => Err(TelemetryError::Config(format!(
                "unsupported MDT encoding {}",
                encoding
            ))),
        }
    }
}

/// Builds the gNMI `Subscribe` request sent once per session.
///
/// # Errors
/// - `Config` on an unknown mode, a non-`proto` encoding, no subscriptions,
///   or `once` mixed with streaming modes
/// - `MalformedPath` when the prefix or a subscription path does not parse
pub fn build_gnmi_request(config: &GnmiConfig) -> Result<SubscribeRequest, TelemetryError> {
    if !config.encoding.eq_ignore_ascii_case("proto") {
        return Err(TelemetryError::Config(format!(
            "unsupported encoding {}",
            config.encoding
        )));
    }
    if config.subscriptions.is_empty() {
        return Err(TelemetryError::Config(
            "no gNMI subscriptions configured".to_string(),
        ));
    }

    let mut modes = Vec::with_capacity(config.subscriptions.len());
    let mut subscriptions = Vec::with_capacity(config.subscriptions.len());
    for sub in &config.subscriptions {
        let mode = StreamMode::parse(&sub.mode)?;
        subscriptions.push(build_subscription(sub, mode)?);
        modes.push(mode);
    }

    let once = modes.iter().filter(|m| **m == StreamMode::Once).count();
    if once > 0 && once < modes.len() {
        return Err(TelemetryError::Config(
            "subscription mode once cannot be mixed with streaming modes".to_string(),
        ));
    }
    let list_mode = if once > 0 {
        subscription_list::Mode::Once
    } else {
        subscription_list::Mode::Stream
    };

    let prefix = path::parse(&config.origin, &config.prefix, &config.target)?;

    Ok(SubscribeRequest {
        request: Some(subscribe_request::Request::Subscribe(SubscriptionList {
            prefix: Some(Path::from(&prefix)),
            subscription: subscriptions,
            mode: list_mode as i32,
            allow_aggregation: false,
            encoding: Encoding::Proto as i32,
            updates_only: config.updates_only,
        })),
    })
}

fn build_subscription(
    sub: &SubscriptionConfig,
    mode: StreamMode,
) -> Result<Subscription, TelemetryError> {
    let structured = path::parse(&sub.origin, &sub.path, "")?;

    Ok(Subscription {
        path: Some(Path::from(&structured)),
        mode: mode.wire_mode() as i32,
        sample_interval: millis_to_nanos(sub.sample_interval_ms),
        suppress_redundant: sub.suppress_redundant,
        heartbeat_interval: millis_to_nanos(sub.heartbeat_interval_ms),
    })
}

fn millis_to_nanos(ms: u64) -> u64 {
    ms.saturating_mul(1_000_000)
}

/// Builds the IOS XR `CreateSubs` request for a device-side subscription.
pub fn build_create_subs(config: &MdtConfig) -> Result<CreateSubsArgs, TelemetryError> {
    if config.subscription.trim().is_empty() {
        return Err(TelemetryError::Config(
            "MDT subscription name is empty".to_string(),
        ));
    }
    let encoding = MdtEncoding::parse(&config.encoding)?;

    Ok(CreateSubsArgs {
        req_id: config.request_id,
        encode: encoding as i64,
        subidstr: config.subscription.clone(),
        subscriptions: Vec::new(),
    })
}
