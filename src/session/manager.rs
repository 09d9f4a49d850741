//! Session manager - one supervised collection task per target.
//!
//! Every task runs the same loop:
//!
//! 1. **Connecting**: dial the target, bounded by its timeout
//! 2. **Subscribed**: send the subscription request once
//! 3. **Receiving**: read, decode and deliver payloads in arrival order
//! 4. **Closing**: record the error or end of stream
//! 5. Sleep for the redial interval, then start over
//!
//! # Cancellation
//!
//! All tasks share one `CancellationToken`. Every suspension point (dial,
//! subscribe, read, backoff sleep) is raced against it with `tokio::select!`,
//! so a task blocked on a quiet stream stops promptly: the losing read is
//! dropped together with the transport. A cancelled session never redials.
//!
//! # Delivery
//!
//! Events reach the sink in the order they were decoded, per target. There
//! is no ordering across targets. Events that are not well formed are
//! reported through `Diagnostics` and not delivered.

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::state::{Session, SessionState};
use super::transport::{Dialer, TelemetryStream};
use crate::config::TargetConfig;
use crate::decoder::{decode_payload, TelemetryPayload};
use crate::error::TelemetryError;
use crate::sink::{deliver, Diagnostics, EventSink};
use log::{error, info, warn};

/// Supervises the sessions of one transport kind.
pub struct SessionManager<D: Dialer> {
    dialer: Arc<D>,
    targets: Vec<TargetConfig>,
    redial_interval: Duration,
    sink: Arc<dyn EventSink>,
    diagnostics: Arc<dyn Diagnostics>,
    cancel: CancellationToken,
    sessions: RwLock<Vec<Arc<Mutex<Session>>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl<D: Dialer> SessionManager<D> {
    /// Creates a manager. Nothing is dialed until [`start`](Self::start).
    ///
    /// # Errors
    /// `Config` when `redial_interval` is zero.
    pub fn new(
        dialer: D,
        targets: Vec<TargetConfig>,
        redial_interval: Duration,
        sink: Arc<dyn EventSink>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, TelemetryError> {
        if redial_interval.is_zero() {
            return Err(TelemetryError::Config(
                "redial interval must be positive".to_string(),
            ));
        }

        Ok(Self {
            dialer: Arc::new(dialer),
            targets,
            redial_interval,
            sink,
            diagnostics,
            cancel: CancellationToken::new(),
            sessions: RwLock::new(Vec::new()),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Replaces the manager's token, e.g. to share one shutdown signal with
    /// other components.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops every session of this manager when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Spawns one task per target. Must be called from within a tokio
    /// runtime. Returns the number of sessions started; a second call while
    /// sessions are running starts nothing.
    pub fn start(&self) -> usize {
        let mut handles = self.handles.lock();
        if !handles.is_empty() {
            warn!("Session manager already started");
            return 0;
        }

        let mut sessions = self.sessions.write();
        sessions.clear();

        for target in &self.targets {
            let session = Arc::new(Mutex::new(Session::new(target.address.clone())));
            sessions.push(session.clone());

            let task = SessionTask {
                dialer: self.dialer.clone(),
                target: target.clone(),
                redial_interval: self.redial_interval,
                sink: self.sink.clone(),
                diagnostics: self.diagnostics.clone(),
                cancel: self.cancel.clone(),
                session,
            };
            handles.push(tokio::spawn(task.run()));
        }

        info!("Started {} telemetry session(s)", handles.len());
        handles.len()
    }

    /// Cancels every session and waits for the tasks to finish.
    ///
    /// On return all sessions are `Stopped` and no further connection
    /// attempt will be made.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Session task failed: {}", e);
            }
        }

        info!("All telemetry sessions stopped");
    }

    /// Snapshot of every session.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions
            .read()
            .iter()
            .map(|session| session.lock().clone())
            .collect()
    }
}

/// Everything one session task owns.
struct SessionTask<D: Dialer> {
    dialer: Arc<D>,
    target: TargetConfig,
    redial_interval: Duration,
    sink: Arc<dyn EventSink>,
    diagnostics: Arc<dyn Diagnostics>,
    cancel: CancellationToken,
    session: Arc<Mutex<Session>>,
}

impl<D: Dialer> SessionTask<D> {
    async fn run(self) {
        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let result = self.run_once().await;
            self.set_state(SessionState::Closing);

            match result {
                Ok(()) => {}
                Err(TelemetryError::EndOfStream) => {
                    info!("Connection to {} closed by remote", self.target.address);
                    self.session.lock().last_error = Some(TelemetryError::EndOfStream.to_string());
                }
                Err(e) => {
                    error!("Session to {} failed: {}", self.target.address, e);
                    self.session.lock().last_error = Some(e.to_string());
                }
            }

            if self.cancel.is_cancelled() {
                break;
            }
            self.set_state(SessionState::Idle);

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.redial_interval) => {}
            }

            self.session.lock().stats.redials += 1;
            info!(
                "Redialing {} after {:?}",
                self.target.address, self.redial_interval
            );
        }

        let mut session = self.session.lock();
        session.cancelled = true;
        session.transition(SessionState::Stopped);
    }

    /// One connection lifetime. `Ok(())` means the session was cancelled.
    async fn run_once(&self) -> Result<(), TelemetryError> {
        self.set_state(SessionState::Connecting);

        let mut stream = tokio::select! {
            _ = self.cancel.cancelled() => return Ok(()),
            result = self.connect() => result?,
        };
        self.session.lock().stats.connects += 1;

        tokio::select! {
            _ = self.cancel.cancelled() => return Ok(()),
            result = stream.subscribe() => result?,
        }
        self.set_state(SessionState::Subscribed);
        info!("Connection to {} established", self.target.address);

        self.set_state(SessionState::Receiving);
        loop {
            let payload = tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                result = stream.next_payload() => result?,
            };

            match payload {
                Some(payload) => self.handle_payload(payload),
                None => return Err(TelemetryError::EndOfStream),
            }
        }
    }

    async fn connect(&self) -> Result<D::Stream, TelemetryError> {
        match self.target.timeout() {
            Some(timeout) => tokio::time::timeout(timeout, self.dialer.connect(&self.target))
                .await
                .map_err(|_| {
                    TelemetryError::Transport(format!(
                        "connect to {} timed out after {:?}",
                        self.target.address, timeout
                    ))
                })?,
            None => self.dialer.connect(&self.target).await,
        }
    }

    /// Decodes one payload and hands its well-formed events to the sink.
    fn handle_payload(&self, payload: TelemetryPayload) {
        self.session.lock().stats.messages_received += 1;

        let events = match decode_payload(&self.target.address, payload, self.diagnostics.as_ref()) {
            Ok(events) => events,
            Err(e) => {
                warn!("Dropping payload from {}: {}", self.target.address, e);
                self.session.lock().stats.decode_errors += 1;
                self.diagnostics.report_malformed_group(&e.to_string());
                return;
            }
        };

        let emitted = deliver(events, self.sink.as_ref(), self.diagnostics.as_ref());
        self.session.lock().stats.events_emitted += emitted;
    }

    fn set_state(&self, state: SessionState) {
        self.session.lock().transition(state);
    }
}
