//! gNMI dial-in transport.

use super::{open_channel, with_credentials};
use crate::config::{GnmiConfig, TargetConfig};
use crate::decoder::TelemetryPayload;
use crate::error::TelemetryError;
use crate::proto::gnmi::g_nmi_client::GNmiClient;
use crate::proto::gnmi::{SubscribeRequest, SubscribeResponse};
use crate::session::{Dialer, TelemetryStream};
use crate::subscription::build_gnmi_request;
use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tonic::codec::Streaming;
use tonic::transport::Channel;

/// Dials gNMI targets with a prebuilt subscription request.
#[derive(Debug, Clone)]
pub struct GnmiDialer {
    request: SubscribeRequest,
}

impl GnmiDialer {
    /// Builds the subscription request once; invalid configuration fails
    /// here, before any connection.
    pub fn new(config: &GnmiConfig) -> Result<Self, TelemetryError> {
        Ok(Self {
            request: build_gnmi_request(config)?,
        })
    }

    pub fn request(&self) -> &SubscribeRequest {
        &self.request
    }
}

#[async_trait]
impl Dialer for GnmiDialer {
    type Stream = GnmiStream;

    async fn connect(&self, target: &TargetConfig) -> Result<GnmiStream, TelemetryError> {
        let channel = open_channel(target).await?;
        Ok(GnmiStream {
            client: GNmiClient::new(channel),
            target: target.clone(),
            request: self.request.clone(),
            responses: None,
        })
    }
}

/// One gNMI `Subscribe` call.
pub struct GnmiStream {
    client: GNmiClient<Channel>,
    target: TargetConfig,
    request: SubscribeRequest,
    responses: Option<Streaming<SubscribeResponse>>,
}

#[async_trait]
impl TelemetryStream for GnmiStream {
    async fn subscribe(&mut self) -> Result<(), TelemetryError> {
        // The request half stays open; closing it would end the subscription
        let outbound = stream::once(std::future::ready(self.request.clone()))
            .chain(stream::pending::<SubscribeRequest>());
        let request = with_credentials(tonic::Request::new(outbound), &self.target)?;

        let response = self.client.subscribe(request).await?;
        self.responses = Some(response.into_inner());
        Ok(())
    }

    async fn next_payload(&mut self) -> Result<Option<TelemetryPayload>, TelemetryError> {
        let responses = self
            .responses
            .as_mut()
            .ok_or_else(|| TelemetryError::Transport("gNMI stream not subscribed".to_string()))?;

        Ok(responses.message().await?.map(TelemetryPayload::Gnmi))
    }
}
