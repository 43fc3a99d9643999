//! Alert service: the trigger path.
//!
//! The sensor monitors only claim the alarm window and post an
//! [`AlertEvent`]; everything that blocks happens here, on the alert task:
//!
//! ```text
//!  AlertMailbox ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                   │         AlertService         │
//!   OneShotTimer ◀──│ log · arm timer · notify ·   │──▶ MqttPort
//!                   │ clear display                │──▶ DisplayPort
//!                   └──────────────────────────────┘
//! ```
//!
//! All I/O flows through port traits injected at call sites, so the whole
//! path runs on the host against mocks.

use log::debug;

use crate::alarm::AlarmWindow;
use crate::config::SystemConfig;
use crate::events::{AlertEvent, AlertSource};
use crate::fsm::AlertState;

use super::events::AppEvent;
use super::notifier::{Notifier, NotifyOutcome};
use super::ports::{Clock, DisplayPort, EventSink, MqttPort, OneShotTimer};

/// What the alert task did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerReport {
    pub source: AlertSource,
    /// Delay the alarm timer was started with; `None` if it failed to start.
    pub timer_ms: Option<u32>,
    pub notify: NotifyOutcome,
}

pub struct AlertService<'s> {
    state: &'s AlertState,
    window: AlarmWindow,
    notifier: Notifier,
}

impl<'s> AlertService<'s> {
    pub fn new(state: &'s AlertState, config: &SystemConfig) -> Self {
        Self {
            state,
            window: AlarmWindow::new(config.alarm_duration_ms),
            notifier: Notifier::new(config),
        }
    }

    pub fn state(&self) -> &'s AlertState {
        self.state
    }

    /// Final step of startup: announce readiness, then open the guard.
    pub fn complete_setup(&self, sink: &mut impl EventSink) -> bool {
        if self.state.flags().is_initializing() {
            sink.emit(&AppEvent::InitComplete);
        }
        self.state.complete_setup()
    }

    /// Run the blocking half of an accepted trigger: detection log, alarm
    /// timer, publish attempt, display clear.
    pub fn handle(
        &self,
        event: AlertEvent,
        link: &mut impl MqttPort,
        display: &mut impl DisplayPort,
        timer: &mut impl OneShotTimer,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> TriggerReport {
        match event.source {
            AlertSource::Motion => sink.emit(&AppEvent::MotionDetected),
            AlertSource::Sound { level } => sink.emit(&AppEvent::LoudSoundDetected { level }),
        }

        let flags = self.state.flags();
        let now_ms = clock.uptime_ms();
        let timer_ms = self.window.arm(flags, timer, event.at_ms, now_ms as u32, sink).ok();

        let notify = self.notifier.notify(flags, now_ms, link, display, sink);
        display.clear();

        debug!("alert: {:?} handled, timer={:?}, notify={:?}", event.source, timer_ms, notify);
        TriggerReport { source: event.source, timer_ms, notify }
    }

    /// Take the pending event, if any, and handle it.
    pub fn drain(
        &self,
        link: &mut impl MqttPort,
        display: &mut impl DisplayPort,
        timer: &mut impl OneShotTimer,
        clock: &impl Clock,
        sink: &mut impl EventSink,
    ) -> Option<TriggerReport> {
        let event = self.state.mailbox().take()?;
        Some(self.handle(event, link, display, timer, clock, sink))
    }
}
