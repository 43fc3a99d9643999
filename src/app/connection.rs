//! MQTT connection supervisor.
//!
//! Reacts to connection-status reports from the MQTT client.  Anything other
//! than "accepted" is logged and answered with a fresh connect call:
//!
//! ```text
//!   start() ──▶ Connecting ──accepted──▶ Connected
//!                   ▲   │                    │
//!                   │   └──rejected──┐       │ dropped
//!                   │                ▼       ▼
//!                   └───poll()─── RetryPending
//! ```
//!
//! Under [`ReconnectPolicy::Immediate`] the connect call is re-issued
//! inside [`ConnectionSupervisor::on_status`], once per rejection, with no
//! cap.  [`ReconnectPolicy::Backoff`] defers it to [`poll`] after a doubling
//! delay.  A connect call that fails synchronously (client could not be
//! created) is never retried recursively; it is parked in `RetryPending`
//! and picked up by the next `poll`.
//!
//! [`poll`]: ConnectionSupervisor::poll

use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, MqttPort};
use crate::config::ReconnectPolicy;

// ───────────────────────────────────────────────────────────────
// Connection status
// ───────────────────────────────────────────────────────────────

/// Outcome of a connect call, as reported by the client.  Codes follow the
/// MQTT 3.1.1 CONNACK return codes, with transport-level outcomes above 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Accepted,
    RefusedProtocolVersion,
    RefusedIdentifier,
    RefusedServerUnavailable,
    RefusedBadCredentials,
    RefusedNotAuthorized,
    /// Session dropped after it had been established.
    Disconnected,
    /// No CONNACK within the client's timeout.
    Timeout,
}

impl ConnectionStatus {
    pub fn code(self) -> u16 {
        match self {
            Self::Accepted => 0,
            Self::RefusedProtocolVersion => 1,
            Self::RefusedIdentifier => 2,
            Self::RefusedServerUnavailable => 3,
            Self::RefusedBadCredentials => 4,
            Self::RefusedNotAuthorized => 5,
            Self::Disconnected => 256,
            Self::Timeout => 257,
        }
    }

    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::Accepted,
            1 => Self::RefusedProtocolVersion,
            2 => Self::RefusedIdentifier,
            3 => Self::RefusedServerUnavailable,
            4 => Self::RefusedBadCredentials,
            5 => Self::RefusedNotAuthorized,
            257 => Self::Timeout,
            _ => Self::Disconnected,
        }
    }

    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

// ───────────────────────────────────────────────────────────────
// Supervisor
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Connecting,
    Connected,
    RetryPending { at_ms: u64 },
}

/// What [`ConnectionSupervisor::on_status`] did about a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    Connected,
    /// Connect call re-issued right away.
    Reconnected { attempt: u32 },
    /// Connect call deferred.
    RetryScheduled { delay_ms: u32 },
}

pub struct ConnectionSupervisor {
    policy: ReconnectPolicy,
    state: LinkState,
    /// Reconnect calls issued since boot (the initial connect is not one).
    attempts: u32,
    rejections: u32,
    backoff_ms: u32,
}

impl ConnectionSupervisor {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: LinkState::Idle,
            attempts: 0,
            rejections: 0,
            backoff_ms: Self::initial_backoff(policy),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.attempts
    }

    pub fn rejections(&self) -> u32 {
        self.rejections
    }

    /// Initial connect at boot.
    pub fn start(&mut self, now_ms: u64, link: &mut impl MqttPort, sink: &mut impl EventSink) {
        self.issue_connect(now_ms, link, sink);
    }

    /// Handle one status report from the client.
    pub fn on_status(
        &mut self,
        status: ConnectionStatus,
        now_ms: u64,
        link: &mut impl MqttPort,
        sink: &mut impl EventSink,
    ) -> Reaction {
        if status.is_accepted() {
            self.state = LinkState::Connected;
            self.backoff_ms = Self::initial_backoff(self.policy);
            sink.emit(&AppEvent::MqttConnected);
            return Reaction::Connected;
        }

        self.rejections = self.rejections.saturating_add(1);
        sink.emit(&AppEvent::MqttRejected(status));

        match self.policy {
            ReconnectPolicy::Immediate => {
                self.reconnect(now_ms, link, sink);
                Reaction::Reconnected { attempt: self.attempts }
            }
            ReconnectPolicy::Backoff { .. } => {
                let delay_ms = self.schedule_retry(now_ms);
                Reaction::RetryScheduled { delay_ms }
            }
        }
    }

    /// Fire a parked retry once its deadline has passed.  Returns whether a
    /// connect call was issued.
    pub fn poll(&mut self, now_ms: u64, link: &mut impl MqttPort, sink: &mut impl EventSink) -> bool {
        match self.state {
            LinkState::RetryPending { at_ms } if now_ms >= at_ms => {
                self.reconnect(now_ms, link, sink);
                true
            }
            _ => false,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn reconnect(&mut self, now_ms: u64, link: &mut impl MqttPort, sink: &mut impl EventSink) {
        self.attempts = self.attempts.saturating_add(1);
        sink.emit(&AppEvent::MqttReconnecting { attempt: self.attempts });
        self.issue_connect(now_ms, link, sink);
    }

    fn issue_connect(&mut self, now_ms: u64, link: &mut impl MqttPort, sink: &mut impl EventSink) {
        match link.connect() {
            Ok(()) => self.state = LinkState::Connecting,
            Err(e) => {
                debug!("mqtt: connect call failed ({e})");
                sink.emit(&AppEvent::MqttClientCreateFailed);
                self.schedule_retry(now_ms);
            }
        }
    }

    fn schedule_retry(&mut self, now_ms: u64) -> u32 {
        let delay_ms = match self.policy {
            ReconnectPolicy::Immediate => 0,
            ReconnectPolicy::Backoff { max_ms, .. } => {
                let delay = self.backoff_ms;
                self.backoff_ms = self.backoff_ms.saturating_mul(2).min(max_ms);
                delay
            }
        };
        self.state = LinkState::RetryPending { at_ms: now_ms + u64::from(delay_ms) };
        delay_ms
    }

    fn initial_backoff(policy: ReconnectPolicy) -> u32 {
        match policy {
            ReconnectPolicy::Immediate => 0,
            ReconnectPolicy::Backoff { initial_ms, .. } => initial_ms,
        }
    }
}
