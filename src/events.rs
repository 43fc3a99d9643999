//! Alert events and the single-slot mailbox that carries them out of
//! interrupt context.
//!
//! Events are produced by:
//! - the PIR rising-edge ISR (motion)
//! - the 200 ms sound poll timer callback (sound)
//!
//! and consumed by the alert task, which runs the blocking part of the
//! trigger sequence (detection log, alarm timer, publish, display).
//!
//! ```text
//! ┌─────────────┐   claim window   ┌──────────────┐     ┌──────────────┐
//! │ PIR ISR     │────────────────▶│  AlertMailbox │────▶│  Alert task  │
//! │ Sound timer │────────────────▶│  (1 slot,     │     │  (consumer)  │
//! └─────────────┘                  │   lock-free)  │     └──────────────┘
//!                                  └──────────────┘
//! ```
//!
//! At most one event can be in flight: a producer only posts after it won
//! the `alarm_active` claim, and the claim is only released by the alarm
//! timer, which is armed after the event has been taken.

use core::sync::atomic::{AtomicU8, AtomicU16, AtomicU32, Ordering};

use crate::fsm::SystemPhase;

/// Which sensor raised the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSource {
    Motion,
    /// Carries the ADC sample that crossed the threshold.
    Sound { level: u16 },
}

/// An accepted trigger, timestamped at the instant the window was claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertEvent {
    pub source: AlertSource,
    /// Milliseconds since boot, wrapping (32-bit atomics only on Xtensa).
    pub at_ms: u32,
}

impl AlertEvent {
    pub const fn motion(at_ms: u32) -> Self {
        Self { source: AlertSource::Motion, at_ms }
    }

    pub const fn sound(level: u16, at_ms: u32) -> Self {
        Self { source: AlertSource::Sound { level }, at_ms }
    }
}

/// Result of offering a sensor trigger to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Window claimed and event handed to the alert task.
    Accepted,
    /// Guard closed; silently ignored.
    Suppressed(SystemPhase),
    /// Mailbox occupied; the claim was rolled back.
    Dropped,
}

impl TriggerOutcome {
    pub fn is_accepted(self) -> bool {
        self == Self::Accepted
    }
}

// ── Lock-free single-slot mailbox ─────────────────────────────
//
// One producer at a time (whoever won the alarm claim), one consumer
// (the alert task).  The slot state moves EMPTY → WRITING → FULL → EMPTY.

const SLOT_EMPTY: u8 = 0;
const SLOT_WRITING: u8 = 1;
const SLOT_FULL: u8 = 2;

const SOURCE_MOTION: u8 = 0;
const SOURCE_SOUND: u8 = 1;

pub struct AlertMailbox {
    state: AtomicU8,
    source: AtomicU8,
    level: AtomicU16,
    at_ms: AtomicU32,
}

impl Default for AlertMailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertMailbox {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(SLOT_EMPTY),
            source: AtomicU8::new(SOURCE_MOTION),
            level: AtomicU16::new(0),
            at_ms: AtomicU32::new(0),
        }
    }

    /// Deposit an event.  ISR-safe.  Hands the event back if the slot is
    /// taken.
    pub fn post(&self, event: AlertEvent) -> Result<(), AlertEvent> {
        if self
            .state
            .compare_exchange(SLOT_EMPTY, SLOT_WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(event);
        }

        let (source, level) = match event.source {
            AlertSource::Motion => (SOURCE_MOTION, 0),
            AlertSource::Sound { level } => (SOURCE_SOUND, level),
        };
        self.source.store(source, Ordering::Relaxed);
        self.level.store(level, Ordering::Relaxed);
        self.at_ms.store(event.at_ms, Ordering::Relaxed);

        self.state.store(SLOT_FULL, Ordering::Release);
        Ok(())
    }

    /// Remove the pending event, if any.  Single consumer.
    pub fn take(&self) -> Option<AlertEvent> {
        if self.state.load(Ordering::Acquire) != SLOT_FULL {
            return None;
        }

        let at_ms = self.at_ms.load(Ordering::Relaxed);
        let source = match self.source.load(Ordering::Relaxed) {
            SOURCE_SOUND => AlertSource::Sound { level: self.level.load(Ordering::Relaxed) },
            _ => AlertSource::Motion,
        };

        self.state.store(SLOT_EMPTY, Ordering::Release);
        Some(AlertEvent { source, at_ms })
    }

    pub fn is_empty(&self) -> bool {
        self.state.load(Ordering::Acquire) == SLOT_EMPTY
    }
}
