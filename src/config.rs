//! Collector configuration.
//!
//! Loaded from a JSON file; credentials may be supplied through the
//! environment instead of the file.

use crate::error::TelemetryError;
use crate::sink::EventLogConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const USERNAME_ENV: &str = "TELEMETRY_USERNAME";
pub const PASSWORD_ENV: &str = "TELEMETRY_PASSWORD";

/// Dial-in protocol spoken by a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialInProtocol {
    Gnmi,
    Mdt,
}

impl std::fmt::Display for DialInProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialInProtocol::Gnmi => write!(f, "gnmi"),
            DialInProtocol::Mdt => write!(f, "mdt"),
        }
    }
}

/// Top-level collector configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Devices to dial (gNMI or MDT dial-in)
    pub targets: Vec<TargetConfig>,

    /// Pause between a failed session and the next dial
    pub redial_interval_secs: u64,

    pub gnmi: Option<GnmiConfig>,
    pub mdt: Option<MdtConfig>,
    pub dialout: Option<DialoutConfig>,

    /// Write events to rotating JSON-lines files instead of the log
    pub event_log: Option<EventLogConfig>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            redial_interval_secs: 10,
            gnmi: None,
            mdt: None,
            dialout: None,
            event_log: None,
        }
    }
}

/// Connection descriptor for one device
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// `host:port`
    pub address: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Connect timeout, 0 for none
    pub timeout_secs: u64,
    /// Required when both `gnmi` and `mdt` are configured
    pub protocol: Option<DialInProtocol>,
}

impl TargetConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// gNMI dial-in subscription
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GnmiConfig {
    /// Only `proto` is supported
    pub encoding: String,
    pub origin: String,
    pub prefix: String,
    pub target: String,
    pub updates_only: bool,
    pub subscriptions: Vec<SubscriptionConfig>,
}

impl Default for GnmiConfig {
    fn default() -> Self {
        Self {
            encoding: "proto".to_string(),
            origin: String::new(),
            prefix: String::new(),
            target: String::new(),
            updates_only: false,
            subscriptions: Vec::new(),
        }
    }
}

/// One gNMI subscription path
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriptionConfig {
    pub origin: String,
    pub path: String,
    /// `once`, `sample`, `on_change` or `target_defined`
    pub mode: String,
    pub sample_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub suppress_redundant: bool,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            origin: String::new(),
            path: String::new(),
            mode: "target_defined".to_string(),
            sample_interval_ms: 0,
            heartbeat_interval_ms: 0,
            suppress_redundant: false,
        }
    }
}

/// IOS XR MDT dial-in subscription
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MdtConfig {
    /// Subscription name configured on the device
    pub subscription: String,
    /// `gpb`, `gpbkv` or `json`
    pub encoding: String,
    pub request_id: i64,
}

impl Default for MdtConfig {
    fn default() -> Self {
        Self {
            subscription: String::new(),
            encoding: "gpbkv".to_string(),
            request_id: 1,
        }
    }
}

/// MDT dial-out listener
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialoutConfig {
    pub listen_addr: String,
}

impl Default for DialoutConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:57500".to_string(),
        }
    }
}

impl CollectorConfig {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TelemetryError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let mut config: CollectorConfig = serde_json::from_str(&raw)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Fills credentials missing from the file from the environment.
    pub fn apply_env(&mut self) {
        let username = std::env::var(USERNAME_ENV).ok();
        let password = std::env::var(PASSWORD_ENV).ok();

        for target in &mut self.targets {
            if target.username.is_none() {
                target.username = username.clone();
            }
            if target.password.is_none() {
                target.password = password.clone();
            }
        }
    }

    pub fn validate(&self) -> Result<(), TelemetryError> {
        if self.redial_interval_secs == 0 {
            return Err(TelemetryError::Config(
                "redial interval must be positive".to_string(),
            ));
        }

        if self.gnmi.is_none() && self.mdt.is_none() && self.dialout.is_none() {
            return Err(TelemetryError::Config(
                "no gnmi, mdt or dialout section configured".to_string(),
            ));
        }

        if let Some(target) = self.targets.iter().find(|t| t.address.trim().is_empty()) {
            return Err(TelemetryError::Config(format!(
                "target with empty address (username: {:?})",
                target.username
            )));
        }

        for target in &self.targets {
            if self.protocol_of(target).is_none() {
                let reason = match target.protocol {
                    Some(protocol) => format!("no {} section is configured", protocol),
                    None if self.gnmi.is_some() && self.mdt.is_some() => {
                        "both gnmi and mdt are configured, set its protocol".to_string()
                    }
                    None => "no dial-in section is configured".to_string(),
                };
                return Err(TelemetryError::Config(format!(
                    "target {}: {}",
                    target.address, reason
                )));
            }
        }

        for (configured, protocol) in [
            (self.gnmi.is_some(), DialInProtocol::Gnmi),
            (self.mdt.is_some(), DialInProtocol::Mdt),
        ] {
            if configured && self.targets_for(protocol).is_empty() {
                return Err(TelemetryError::Config(format!(
                    "{} dial-in requires at least one target",
                    protocol
                )));
            }
        }

        Ok(())
    }

    /// Protocol a target is dialed with, if any configured section claims it.
    /// An untagged target belongs to the only dial-in section configured.
    pub fn protocol_of(&self, target: &TargetConfig) -> Option<DialInProtocol> {
        let configured = |protocol: DialInProtocol| match protocol {
            DialInProtocol::Gnmi => self.gnmi.is_some(),
            DialInProtocol::Mdt => self.mdt.is_some(),
        };

        match target.protocol {
            Some(protocol) => configured(protocol).then_some(protocol),
            None => match (self.gnmi.is_some(), self.mdt.is_some()) {
                (true, false) => Some(DialInProtocol::Gnmi),
                (false, true) => Some(DialInProtocol::Mdt),
                _ => None,
            },
        }
    }

    /// Targets dialed with `protocol`.
    pub fn targets_for(&self, protocol: DialInProtocol) -> Vec<TargetConfig> {
        self.targets
            .iter()
            .filter(|target| self.protocol_of(target) == Some(protocol))
            .cloned()
            .collect()
    }

    pub fn redial_interval(&self) -> Duration {
        Duration::from_secs(self.redial_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let raw = r#"{
            "targets": [{"address": "10.0.0.1:57400", "username": "admin", "timeout_secs": 5}],
            "redial_interval_secs": 3,
            "gnmi": {
                "subscriptions": [
                    {"path": "/interfaces/interface/state/counters", "mode": "sample", "sample_interval_ms": 10000}
                ]
            },
            "event_log": {"base_dir": "/tmp/telemetry", "rotation": {"by_size": 1024}}
        }"#;

        let config: CollectorConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.redial_interval(), Duration::from_secs(3));
        assert_eq!(config.targets[0].timeout(), Some(Duration::from_secs(5)));

        let gnmi = config.gnmi.as_ref().unwrap();
        assert_eq!(gnmi.encoding, "proto");
        assert_eq!(gnmi.subscriptions[0].mode, "sample");

        let log = config.event_log.as_ref().unwrap();
        assert_eq!(log.rotation, crate::sink::RotationPolicy::BySize(1024));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_redial() {
        let config = CollectorConfig {
            redial_interval_secs: 0,
            dialout: Some(DialoutConfig::default()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TelemetryError::Config(_))));
    }

    #[test]
    fn test_validate_requires_targets_for_dial_in() {
        let config = CollectorConfig {
            mdt: Some(MdtConfig::default()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TelemetryError::Config(_))));

        let dialout_only = CollectorConfig {
            dialout: Some(DialoutConfig::default()),
            ..Default::default()
        };
        assert!(dialout_only.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_address() {
        let config = CollectorConfig {
            targets: vec![TargetConfig::new(" ")],
            gnmi: Some(GnmiConfig::default()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_targets_split_by_protocol() {
        let raw = r#"{
            "targets": [
                {"address": "10.0.0.1:57400", "protocol": "gnmi"},
                {"address": "10.0.0.2:57400", "protocol": "mdt"}
            ],
            "gnmi": {},
            "mdt": {"subscription": "ifstats"}
        }"#;

        let config: CollectorConfig = serde_json::from_str(raw).unwrap();
        assert!(config.validate().is_ok());

        let gnmi = config.targets_for(DialInProtocol::Gnmi);
        let mdt = config.targets_for(DialInProtocol::Mdt);
        assert_eq!(gnmi.len(), 1);
        assert_eq!(gnmi[0].address, "10.0.0.1:57400");
        assert_eq!(mdt.len(), 1);
        assert_eq!(mdt[0].address, "10.0.0.2:57400");
    }

    #[test]
    fn test_validate_rejects_unclaimed_target() {
        // Untagged target with both dial-in sections
        let ambiguous = CollectorConfig {
            targets: vec![TargetConfig::new("r1:57400")],
            gnmi: Some(GnmiConfig::default()),
            mdt: Some(MdtConfig::default()),
            ..Default::default()
        };
        assert!(matches!(ambiguous.validate(), Err(TelemetryError::Config(_))));

        // Tagged for a section that is not configured
        let missing_section = CollectorConfig {
            targets: vec![TargetConfig {
                protocol: Some(DialInProtocol::Mdt),
                ..TargetConfig::new("r1:57400")
            }],
            gnmi: Some(GnmiConfig::default()),
            ..Default::default()
        };
        assert!(matches!(missing_section.validate(), Err(TelemetryError::Config(_))));

        // Targets with only a dial-out listener
        let dialout_only = CollectorConfig {
            targets: vec![TargetConfig::new("r1:57400")],
            dialout: Some(DialoutConfig::default()),
            ..Default::default()
        };
        assert!(matches!(dialout_only.validate(), Err(TelemetryError::Config(_))));
    }

    #[test]
    fn test_validate_requires_targets_per_section() {
        let config = CollectorConfig {
            targets: vec![TargetConfig {
                protocol: Some(DialInProtocol::Gnmi),
                ..TargetConfig::new("r1:57400")
            }],
            gnmi: Some(GnmiConfig::default()),
            mdt: Some(MdtConfig::default()),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(TelemetryError::Config(_))));
    }

    #[test]
    fn test_untagged_target_belongs_to_only_section() {
        let config = CollectorConfig {
            targets: vec![TargetConfig::new("r1:57400")],
            mdt: Some(MdtConfig::default()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.targets_for(DialInProtocol::Mdt).len(), 1);
        assert!(config.targets_for(DialInProtocol::Gnmi).is_empty());
    }

    #[test]
    fn test_load_reads_file() -> Result<(), TelemetryError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("telemetry.json");
        std::fs::write(&path, r#"{"dialout": {"listen_addr": "127.0.0.1:0"}}"#)?;

        let config = CollectorConfig::load(&path)?;
        assert_eq!(config.dialout.unwrap().listen_addr, "127.0.0.1:0");
        Ok(())
    }
}
