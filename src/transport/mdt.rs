//! IOS XR MDT dial-in transport (`gRPCConfigOper/CreateSubs`).

use super::{open_channel, with_credentials};
use crate::config::{MdtConfig, TargetConfig};
use crate::decoder::TelemetryPayload;
use crate::error::TelemetryError;
use crate::proto::ems::g_rpc_config_oper_client::GRpcConfigOperClient;
use crate::proto::ems::{CreateSubsArgs, CreateSubsReply};
use crate::session::{Dialer, TelemetryStream};
use crate::subscription::build_create_subs;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use tonic::codec::Streaming;
use tonic::transport::Channel;

/// Dials IOS XR devices for a device-side subscription.
#[derive(Debug, Clone)]
pub struct MdtDialer {
    args: CreateSubsArgs,
}

impl MdtDialer {
    pub fn new(config: &MdtConfig) -> Result<Self, TelemetryError> {
        Ok(Self {
            args: build_create_subs(config)?,
        })
    }
}

#[async_trait]
impl Dialer for MdtDialer {
    type Stream = MdtStream;

    async fn connect(&self, target: &TargetConfig) -> Result<MdtStream, TelemetryError> {
        let channel = open_channel(target).await?;
        Ok(MdtStream {
            client: GRpcConfigOperClient::new(channel),
            target: target.clone(),
            args: self.args.clone(),
            replies: None,
        })
    }
}

/// One `CreateSubs` call.
pub struct MdtStream {
    client: GRpcConfigOperClient<Channel>,
    target: TargetConfig,
    args: CreateSubsArgs,
    replies: Option<Streaming<CreateSubsReply>>,
}

#[async_trait]
impl TelemetryStream for MdtStream {
    async fn subscribe(&mut self) -> Result<(), TelemetryError> {
        let request = with_credentials(tonic::Request::new(self.args.clone()), &self.target)?;
        let response = self.client.create_subs(request).await?;
        self.replies = Some(response.into_inner());
        Ok(())
    }

    async fn next_payload(&mut self) -> Result<Option<TelemetryPayload>, TelemetryError> {
        let replies = self
            .replies
            .as_mut()
            .ok_or_else(|| TelemetryError::Transport("MDT stream not subscribed".to_string()))?;

        next_reply_payload(replies, &self.target.address).await
    }
}

/// Reads replies until one carries data. Keepalives carry neither data nor
/// errors and are skipped. A reply with errors and no data ends the stream.
pub(crate) async fn next_reply_payload<S>(
    replies: &mut S,
    address: &str,
) -> Result<Option<TelemetryPayload>, TelemetryError>
where
    S: Stream<Item = Result<CreateSubsReply, tonic::Status>> + Unpin,
{
    while let Some(reply) = replies.next().await {
        let reply = reply?;

        if !reply.errors.is_empty() {
            if reply.data.is_empty() {
                return Err(TelemetryError::Transport(format!(
                    "device {} reported: {}",
                    address, reply.errors
                )));
            }
            log::warn!("Device {} reported: {}", address, reply.errors);
        }

        if !reply.data.is_empty() {
            return Ok(Some(TelemetryPayload::Mdt(reply.data)));
        }
    }

    Ok(None)
}
