//! The three shared alert flags.
//!
//! Written from the main task, the PIR ISR, timer callbacks and the alert
//! task.  Every transition is a single atomic operation; every guard check
//! re-reads the current values.

use core::sync::atomic::{AtomicBool, Ordering};

use super::SystemPhase;

/// Plain-value copy of the flags, for inspection and for seeding a state
/// in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagSnapshot {
    pub initializing: bool,
    pub alarm_active: bool,
    pub sending: bool,
}

impl FlagSnapshot {
    pub const BOOT: Self = Self { initializing: true, alarm_active: false, sending: false };

    pub fn phase(self) -> SystemPhase {
        if self.initializing {
            SystemPhase::Initializing
        } else if self.alarm_active || self.sending {
            SystemPhase::Alerting
        } else {
            SystemPhase::Idle
        }
    }

    /// The trigger guard: only an Idle system accepts a trigger.
    pub fn accepts_trigger(self) -> bool {
        !self.initializing && !self.alarm_active && !self.sending
    }
}

pub struct AlertFlags {
    initializing: AtomicBool,
    alarm_active: AtomicBool,
    sending: AtomicBool,
}

impl Default for AlertFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertFlags {
    /// Boot values: initializing, nothing armed, nothing in flight.
    pub const fn new() -> Self {
        Self::from_snapshot(FlagSnapshot::BOOT)
    }

    pub const fn from_snapshot(s: FlagSnapshot) -> Self {
        Self {
            initializing: AtomicBool::new(s.initializing),
            alarm_active: AtomicBool::new(s.alarm_active),
            sending: AtomicBool::new(s.sending),
        }
    }

    pub fn snapshot(&self) -> FlagSnapshot {
        FlagSnapshot {
            initializing: self.initializing.load(Ordering::Acquire),
            alarm_active: self.alarm_active.load(Ordering::Acquire),
            sending: self.sending.load(Ordering::Acquire),
        }
    }

    pub fn phase(&self) -> SystemPhase {
        self.snapshot().phase()
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing.load(Ordering::Acquire)
    }

    pub fn alarm_active(&self) -> bool {
        self.alarm_active.load(Ordering::Acquire)
    }

    pub fn sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Advisory guard check.  [`try_arm`](Self::try_arm) is the
    /// authoritative one.
    pub fn accepts_trigger(&self) -> bool {
        self.snapshot().accepts_trigger()
    }

    /// Leave the Initializing phase.  Returns `true` only for the call that
    /// actually cleared the flag.
    pub fn complete_init(&self) -> bool {
        self.initializing.swap(false, Ordering::AcqRel)
    }

    /// Claim the alarm window.  The compare-exchange on `alarm_active` is
    /// the point at which a trigger is accepted; of two racing sources at
    /// most one wins.
    pub(crate) fn try_arm(&self) -> bool {
        if self.initializing.load(Ordering::Acquire) || self.sending.load(Ordering::Acquire) {
            return false;
        }
        self.alarm_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Close the alarm window.  Returns whether it was open.
    pub(crate) fn clear_alarm(&self) -> bool {
        self.alarm_active.swap(false, Ordering::AcqRel)
    }

    /// Open the publish window.  `sending` stays set until the returned
    /// guard is dropped, whatever path the attempt takes.
    pub(crate) fn begin_send(&self) -> SendWindow<'_> {
        self.sending.store(true, Ordering::Release);
        SendWindow { flags: self }
    }
}

/// RAII bracket around a publish attempt.
pub struct SendWindow<'a> {
    flags: &'a AlertFlags,
}

impl Drop for SendWindow<'_> {
    fn drop(&mut self) {
        self.flags.sending.store(false, Ordering::Release);
    }
}
