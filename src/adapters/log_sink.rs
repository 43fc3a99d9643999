//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each [`AppEvent`]'s console line to
//! the ESP-IDF logger (UART / USB-CDC in production).  Failures go out at
//! `warn`, everything else at `info`.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::LoudSoundDetected { level } => info!("{event} (nível={level})"),
            AppEvent::MqttReconnecting { attempt } => info!("{event} (tentativa {attempt})"),
            AppEvent::MessageFailed(cause) | AppEvent::WifiFailed(cause) => warn!("{event} ({cause})"),
            e if e.is_failure() => warn!("{e}"),
            e => info!("{e}"),
        }
    }
}
