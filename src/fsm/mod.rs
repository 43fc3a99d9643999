//! Alert controller state machine.
//!
//! The phase is never stored; it is derived from three atomic flags that
//! every execution context shares:
//!
//! ```text
//! ┌──────────────┬─────────────────────────────┬──────────────┐
//! │ From         │ Event                       │ To           │
//! ├──────────────┼─────────────────────────────┼──────────────┤
//! │ Initializing │ setup complete              │ Idle         │
//! │ Idle         │ motion edge / loud sample   │ Alerting     │
//! │ Alerting     │ alarm timer expiry          │ Idle         │
//! └──────────────┴─────────────────────────────┴──────────────┘
//! ```
//!
//! Triggers outside Idle are dropped without queueing.  [`AlertState`]
//! bundles the flags with the mailbox that carries accepted triggers to
//! the alert task; one static instance is shared by the ISR, timer
//! callbacks, the alert task and the main loop.

pub mod flags;

use flags::{AlertFlags, FlagSnapshot};

use crate::events::{AlertEvent, AlertMailbox, TriggerOutcome};

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SystemPhase {
    Initializing = 0,
    Idle = 1,
    Alerting = 2,
}

impl SystemPhase {
    pub const COUNT: usize = 3;

    pub fn name(self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::Idle => "Idle",
            Self::Alerting => "Alerting",
        }
    }

    /// Transition table lookup.  `None` means the event is ignored in this
    /// phase.
    pub fn after(self, transition: Transition) -> Option<SystemPhase> {
        match (self, transition) {
            (Self::Initializing, Transition::SetupComplete) => Some(Self::Idle),
            (Self::Idle, Transition::Trigger) => Some(Self::Alerting),
            (Self::Alerting, Transition::AlarmExpired) => Some(Self::Idle),
            _ => None,
        }
    }
}

/// Events that move the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SetupComplete,
    Trigger,
    AlarmExpired,
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

pub struct AlertState {
    flags: AlertFlags,
    mailbox: AlertMailbox,
}

impl Default for AlertState {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertState {
    pub const fn new() -> Self {
        Self { flags: AlertFlags::new(), mailbox: AlertMailbox::new() }
    }

    pub const fn with_flags(snapshot: FlagSnapshot) -> Self {
        Self { flags: AlertFlags::from_snapshot(snapshot), mailbox: AlertMailbox::new() }
    }

    pub fn flags(&self) -> &AlertFlags {
        &self.flags
    }

    pub fn mailbox(&self) -> &AlertMailbox {
        &self.mailbox
    }

    pub fn phase(&self) -> SystemPhase {
        self.flags.phase()
    }

    /// End of the startup sequence.  Returns `false` if setup had already
    /// been completed.
    pub fn complete_setup(&self) -> bool {
        self.flags.complete_init()
    }

    /// The single trigger function both sensor monitors feed.
    ///
    /// Safe from interrupt context: atomics only, no logging, no blocking.
    pub fn submit(&self, event: AlertEvent) -> TriggerOutcome {
        if !self.flags.try_arm() {
            return TriggerOutcome::Suppressed(self.flags.phase());
        }
        match self.mailbox.post(event) {
            Ok(()) => TriggerOutcome::Accepted,
            Err(_) => {
                // Slot still full: release the claim, no timer would close it.
                self.flags.clear_alarm();
                TriggerOutcome::Dropped
            }
        }
    }
}

/// Process-wide instance used by the ISR, timer callbacks and tasks.
pub static ALERT_STATE: AlertState = AlertState::new();
