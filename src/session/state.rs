//! Session lifecycle state and counters.

use std::fmt;

/// Lifecycle of one target session.
///
/// `Idle → Connecting → Subscribed → Receiving → Closing → Idle`, ending in
/// `Stopped` once cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Subscribed,
    Receiving,
    Closing,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Subscribed => "subscribed",
            SessionState::Receiving => "receiving",
            SessionState::Closing => "closing",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Session counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Successful connections
    pub connects: u64,
    /// Dial attempts after the first
    pub redials: u64,
    pub messages_received: u64,
    /// Well-formed events handed to the sink
    pub events_emitted: u64,
    /// Payloads that could not be decoded
    pub decode_errors: u64,
}

/// One collection session against a single target.
#[derive(Debug, Clone)]
pub struct Session {
    pub target: String,
    pub state: SessionState,
    pub stats: SessionStats,
    pub last_error: Option<String>,
    /// Set once the session ended because of cancellation
    pub cancelled: bool,
}

impl Session {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            state: SessionState::Idle,
            stats: SessionStats::default(),
            last_error: None,
            cancelled: false,
        }
    }

    /// Moves to `next`. `Stopped` is terminal.
    pub fn transition(&mut self, next: SessionState) {
        if self.state == SessionState::Stopped {
            return;
        }
        log::debug!("Session {}: {} -> {}", self.target, self.state, next);
        self.state = next;
    }

    pub fn is_stopped(&self) -> bool {
        self.state == SessionState::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_is_terminal() {
        let mut session = Session::new("10.0.0.1:57400");
        session.transition(SessionState::Connecting);
        session.transition(SessionState::Stopped);
        session.transition(SessionState::Idle);
        assert!(session.is_stopped());
    }
}
