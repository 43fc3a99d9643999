//! Alarm timer.
//!
//! A one-shot deadline armed each time the alarm window opens.  The window
//! is measured from the instant the trigger claimed it (the ISR timestamp),
//! not from when the alert task got round to arming the timer, so the flag
//! drops exactly `alarm_duration_ms` after the trigger.  Expiry is the only
//! thing that closes the window; the timer is never cancelled or re-armed
//! while running.

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, OneShotTimer};
use crate::error::TimerError;
use crate::fsm::flags::AlertFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmWindow {
    duration_ms: u32,
}

impl AlarmWindow {
    pub const fn new(duration_ms: u32) -> Self {
        Self { duration_ms }
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Time left in a window claimed at `armed_at_ms`.  Timestamps are
    /// wrapping 32-bit milliseconds.
    pub fn remaining_ms(&self, armed_at_ms: u32, now_ms: u32) -> u32 {
        self.duration_ms.saturating_sub(now_ms.wrapping_sub(armed_at_ms))
    }

    /// Start the one-shot for the rest of the window.  If the timer cannot
    /// be started the window is closed on the spot so the controller never
    /// latches in Alerting.
    pub fn arm(
        &self,
        flags: &AlertFlags,
        timer: &mut impl OneShotTimer,
        armed_at_ms: u32,
        now_ms: u32,
        sink: &mut impl EventSink,
    ) -> Result<u32, TimerError> {
        sink.emit(&AppEvent::AlarmArmed { duration_ms: self.duration_ms });
        let remaining = self.remaining_ms(armed_at_ms, now_ms);
        match timer.start_once(remaining) {
            Ok(()) => Ok(remaining),
            Err(e) => {
                sink.emit(&AppEvent::AlarmTimerFailed(e));
                on_expired(flags, sink);
                Err(e)
            }
        }
    }
}

/// Expiry handler, run from timer-callback context.
pub fn on_expired(flags: &AlertFlags, sink: &mut impl EventSink) -> bool {
    let was_open = flags.clear_alarm();
    if was_open {
        sink.emit(&AppEvent::AlarmDisarmed);
    }
    was_open
}
