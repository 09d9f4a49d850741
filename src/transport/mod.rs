//! gRPC transport adapters.
//!
//! - [`GnmiDialer`]: gNMI `Subscribe` (dial-in)
//! - [`MdtDialer`]: IOS XR `CreateSubs` (dial-in)
//! - [`DialoutServer`]: `gRPCMdtDialout` listener (dial-out)

pub mod dialout;
pub mod gnmi;
pub mod mdt;

pub use dialout::DialoutServer;
pub use gnmi::{GnmiDialer, GnmiStream};
pub use mdt::{MdtDialer, MdtStream};

use crate::config::TargetConfig;
use crate::error::TelemetryError;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};

/// Opens a plaintext HTTP/2 channel to the target.
pub(crate) async fn open_channel(target: &TargetConfig) -> Result<Channel, TelemetryError> {
    let uri = if target.address.contains("://") {
        target.address.clone()
    } else {
        format!("http://{}", target.address)
    };

    let mut endpoint = Endpoint::from_shared(uri)?;
    if let Some(timeout) = target.timeout() {
        endpoint = endpoint.connect_timeout(timeout);
    }

    Ok(endpoint.connect().await?)
}

/// Attaches `username` / `password` metadata when configured.
pub(crate) fn with_credentials<T>(
    mut request: tonic::Request<T>,
    target: &TargetConfig,
) -> Result<tonic::Request<T>, TelemetryError> {
    let credentials = [
        ("username", target.username.as_deref()),
        ("password", target.password.as_deref()),
    ];

    for (key, value) in credentials {
        if let Some(value) = value {
            let value: MetadataValue<Ascii> = value.parse().map_err(|_| {
                TelemetryError::Config(format!("{} is not valid gRPC metadata", key))
            })?;
            request.metadata_mut().insert(key, value);
        }
    }

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_metadata() {
        let target = TargetConfig {
            username: Some("admin".into()),
            password: Some("secret".into()),
            ..TargetConfig::new("r1:57400")
        };
        let request = with_credentials(tonic::Request::new(()), &target).unwrap();
        assert_eq!(request.metadata().get("username").unwrap().to_str().unwrap(), "admin");
        assert_eq!(request.metadata().get("password").unwrap().to_str().unwrap(), "secret");
    }

    #[test]
    fn test_no_credentials_no_metadata() {
        let request = with_credentials(tonic::Request::new(()), &TargetConfig::new("r1:57400")).unwrap();
        assert!(request.metadata().get("username").is_none());
    }

    #[test]
    fn test_invalid_credentials_rejected() {
        let target = TargetConfig {
            username: Some("bad\nname".into()),
            ..TargetConfig::new("r1:57400")
        };
        assert!(matches!(
            with_credentials(tonic::Request::new(()), &target),
            Err(TelemetryError::Config(_))
        ));
    }
}
