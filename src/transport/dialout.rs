//! MDT dial-out listener.
//!
//! Devices connect to the collector and push `MdtDialoutArgs` messages on a
//! client stream. Each accepted stream is decoded in its own task until the
//! device closes it, reports an error, or the shared token is cancelled.

use crate::config::DialoutConfig;
use crate::decoder::{decode_payload, TelemetryPayload};
use crate::error::TelemetryError;
use crate::proto::mdt_dialout::g_rpc_mdt_dialout_server::{GRpcMdtDialout, GRpcMdtDialoutServer};
use crate::proto::mdt_dialout::MdtDialoutArgs;
use crate::sink::{deliver, Diagnostics, EventSink};
use futures_util::stream::{self, Stream};
use log::{error, info, warn};
use parking_lot::RwLock;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};

/// Counters across all dial-out streams
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialoutStats {
    pub streams_accepted: u64,
    pub messages_received: u64,
    pub events_emitted: u64,
    pub decode_errors: u64,
}

/// gRPC server accepting MDT dial-out streams.
pub struct DialoutServer {
    listen_addr: SocketAddr,
    service: DialoutService,
    cancel: CancellationToken,
}

impl DialoutServer {
    /// # Errors
    /// `Config` when the listen address does not parse.
    pub fn new(
        config: &DialoutConfig,
        sink: Arc<dyn EventSink>,
        diagnostics: Arc<dyn Diagnostics>,
        cancel: CancellationToken,
    ) -> Result<Self, TelemetryError> {
        let listen_addr: SocketAddr = config.listen_addr.parse().map_err(|e| {
            TelemetryError::Config(format!(
                "invalid dial-out listen address {}: {}",
                config.listen_addr, e
            ))
        })?;

        Ok(Self {
            listen_addr,
            service: DialoutService {
                sink,
                diagnostics,
                cancel: cancel.clone(),
                stats: Arc::new(RwLock::new(DialoutStats::default())),
            },
            cancel,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Shared view of the stream counters.
    pub fn stats(&self) -> Arc<RwLock<DialoutStats>> {
        self.service.stats.clone()
    }

    /// Serves until the cancellation token fires.
    pub async fn serve(self) -> Result<(), TelemetryError> {
        info!("Listening for MDT dial-out on {}", self.listen_addr);

        Server::builder()
            .add_service(GRpcMdtDialoutServer::new(self.service))
            .serve_with_shutdown(self.listen_addr, self.cancel.cancelled_owned())
            .await?;

        info!("MDT dial-out listener on {} stopped", self.listen_addr);
        Ok(())
    }
}

#[derive(Clone)]
struct DialoutService {
    sink: Arc<dyn EventSink>,
    diagnostics: Arc<dyn Diagnostics>,
    cancel: CancellationToken,
    stats: Arc<RwLock<DialoutStats>>,
}

type DialoutResponseStream = Pin<Box<dyn Stream<Item = Result<MdtDialoutArgs, Status>> + Send>>;

#[tonic::async_trait]
impl GRpcMdtDialout for DialoutService {
    type MdtDialoutStream = DialoutResponseStream;

    async fn mdt_dialout(
        &self,
        request: Request<Streaming<MdtDialoutArgs>>,
    ) -> Result<Response<Self::MdtDialoutStream>, Status> {
        let peer = request
            .remote_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let inbound = request.into_inner();

        self.stats.write().streams_accepted += 1;
        info!("Accepted MDT dial-out stream from {}", peer);

        let (done_tx, done_rx) = oneshot::channel::<()>();
        let service = self.clone();
        tokio::spawn(async move {
            service.process_stream(&peer, inbound).await;
            drop(done_tx);
        });

        // Nothing is sent back; the response stays open until processing ends
        let outbound = stream::unfold(done_rx, |done_rx| async move {
            let _ = done_rx.await;
            None::<(Result<MdtDialoutArgs, Status>, oneshot::Receiver<()>)>
        });

        Ok(Response::new(Box::pin(outbound) as Self::MdtDialoutStream))
    }
}

impl DialoutService {
    async fn process_stream(&self, peer: &str, mut inbound: Streaming<MdtDialoutArgs>) {
        loop {
            let message = tokio::select! {
                _ = self.cancel.cancelled() => break,
                message = inbound.message() => message,
            };

            let args = match message {
                Ok(Some(args)) => args,
                Ok(None) => {
                    info!("MDT dial-out stream from {} closed", peer);
                    break;
                }
                Err(status) => {
                    error!("MDT dial-out stream from {} failed: {}", peer, status);
                    break;
                }
            };

            if args.data.is_empty() && !args.errors.is_empty() {
                warn!("MDT dial-out from {} reported: {}", peer, args.errors);
                break;
            }

            self.handle_args(peer, args);
        }
    }

    fn handle_args(&self, peer: &str, args: MdtDialoutArgs) {
        self.stats.write().messages_received += 1;

        match decode_payload(peer, TelemetryPayload::Mdt(args.data), self.diagnostics.as_ref()) {
            Ok(events) => {
                let emitted = deliver(events, self.sink.as_ref(), self.diagnostics.as_ref());
                self.stats.write().events_emitted += emitted;
            }
            Err(e) => {
                warn!("Dropping dial-out payload from {}: {}", peer, e);
                self.stats.write().decode_errors += 1;
                self.diagnostics.report_malformed_group(&e.to_string());
            }
        }
    }
}
