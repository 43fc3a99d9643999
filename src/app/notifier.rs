//! Alert notifier.
//!
//! Formats the timestamped alert message and makes exactly one publish
//! attempt on the alert topic (QoS 1, not retained).  The `sending` flag is
//! held for the whole attempt, connected-check included, so no trigger can
//! be accepted while a publish is in flight.

use core::fmt::{self, Write as _};

use crate::app::events::AppEvent;
use crate::app::ports::{DisplayPort, EventSink, MqttPort, QoS};
use crate::config::SystemConfig;
use crate::error::CommsError;
use crate::fsm::flags::AlertFlags;

/// Upper bound on the rendered message; the longest device label and a
/// 20-digit day count still fit.
pub const MAX_PAYLOAD: usize = 128;

/// Shown on the display after the broker took the message.
pub const CONFIRMATION_TEXT: &str = "Mensagem Enviada !";
pub const CONFIRMATION_POS: (i32, i32) = (8, 16);

// ── Uptime breakdown ──────────────────────────────────────────

/// Time since boot split the way the alert message reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Uptime {
    pub days: u64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl Uptime {
    pub fn from_millis(ms: u64) -> Self {
        let secs = ms / 1_000;
        Self {
            days: secs / 86_400,
            hours: ((secs / 3_600) % 24) as u8,
            minutes: ((secs / 60) % 60) as u8,
            seconds: (secs % 60) as u8,
        }
    }
}

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dia {} às {:02}:{:02}:{:02}", self.days, self.hours, self.minutes, self.seconds)
    }
}

// ── Notifier ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    Failed(CommsError),
}

#[derive(Debug, Clone)]
pub struct Notifier {
    topic: heapless::String<32>,
    device: heapless::String<16>,
}

impl Notifier {
    pub fn new(config: &SystemConfig) -> Self {
        Self { topic: config.alert_topic.clone(), device: config.device_name.clone() }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn compose(&self, uptime: Uptime) -> heapless::String<MAX_PAYLOAD> {
        let mut msg = heapless::String::new();
        let _ = write!(msg, "Um Alerta foi detectado no dispositivo {} no {}", self.device, uptime);
        msg
    }

    /// One publish attempt.  No retry on failure.
    pub fn notify(
        &self,
        flags: &AlertFlags,
        now_ms: u64,
        link: &mut impl MqttPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> NotifyOutcome {
        let _window = flags.begin_send();

        if !link.is_connected() {
            sink.emit(&AppEvent::MessageFailed(CommsError::MqttNotConnected));
            return NotifyOutcome::Failed(CommsError::MqttNotConnected);
        }

        let payload = self.compose(Uptime::from_millis(now_ms));
        match link.publish(&self.topic, payload.as_bytes(), QoS::AtLeastOnce, false) {
            Ok(()) => {
                sink.emit(&AppEvent::MessageSent { topic: self.topic.clone(), payload });
                display.clear();
                display.draw_text(CONFIRMATION_POS.0, CONFIRMATION_POS.1, CONFIRMATION_TEXT);
                NotifyOutcome::Sent
            }
            Err(e) => {
                sink.emit(&AppEvent::MessageFailed(e));
                NotifyOutcome::Failed(e)
            }
        }
    }
}
