//! HC-SR501 PIR motion monitor.
//!
//! The PIR output is wired to a pull-up input with a rising-edge
//! interrupt.  The handler runs in ISR context, so it only counts the edge
//! and offers a motion event to the shared [`AlertState`]; the detection
//! log and the rest of the trigger sequence run on the alert task.
//!
//! The GPIO driver masks the line before it runs the handler, and only task
//! context may unmask it.  Every edge therefore wakes the alert task, even
//! one the guard turned away, and the task re-enables the interrupt after
//! [`MotionMonitor::take_rearm`] reports a pending edge.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::events::{AlertEvent, TriggerOutcome};
use crate::fsm::AlertState;

pub struct MotionMonitor {
    edges: AtomicU32,
    rearm: AtomicBool,
}

/// What the interrupt handler must do after one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeReport {
    pub outcome: TriggerOutcome,
    /// Notify the alert task.  Always set: the line stays masked until the
    /// task re-enables it, whatever the guard decided.
    pub wake: bool,
}

impl Default for MotionMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionMonitor {
    pub const fn new() -> Self {
        Self { edges: AtomicU32::new(0), rearm: AtomicBool::new(false) }
    }

    /// Interrupt handler body: offer the edge and flag the line for
    /// re-enabling.
    pub fn on_interrupt(&self, state: &AlertState, now_ms: u32) -> EdgeReport {
        let outcome = self.on_rising_edge(state, now_ms);
        self.rearm.store(true, Ordering::Release);
        EdgeReport { outcome, wake: true }
    }

    /// Task side: `true` once per batch of edges since the last call.
    pub fn take_rearm(&self) -> bool {
        self.rearm.swap(false, Ordering::Acquire)
    }

    /// Rising-edge entry point.  Lock-free; safe from interrupt context.
    pub fn on_rising_edge(&self, state: &AlertState, now_ms: u32) -> TriggerOutcome {
        self.edges.fetch_add(1, Ordering::Relaxed);
        state.submit(AlertEvent::motion(now_ms))
    }

    /// Edges seen since boot, accepted or not.
    pub fn edge_count(&self) -> u32 {
        self.edges.load(Ordering::Relaxed)
    }
}

/// The instance the PIR interrupt handler reports into.
pub static MOTION_MONITOR: MotionMonitor = MotionMonitor::new();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsm::SystemPhase;
    use crate::fsm::flags::FlagSnapshot;

    const IDLE: FlagSnapshot =
        FlagSnapshot { initializing: false, alarm_active: false, sending: false };

    #[test]
    fn edge_in_idle_posts_motion_event() {
        let state = AlertState::with_flags(IDLE);
        let pir = MotionMonitor::new();
        assert_eq!(pir.on_rising_edge(&state, 42), TriggerOutcome::Accepted);
        assert_eq!(state.mailbox().take(), Some(AlertEvent::motion(42)));
    }

    #[test]
    fn edges_are_counted_even_when_suppressed() {
        let state = AlertState::new();
        let pir = MotionMonitor::new();
        assert_eq!(
            pir.on_rising_edge(&state, 1),
            TriggerOutcome::Suppressed(SystemPhase::Initializing)
        );
        pir.on_rising_edge(&state, 2);
        assert_eq!(pir.edge_count(), 2);
        assert!(state.mailbox().is_empty());
    }

    #[test]
    fn suppressed_edge_still_wakes_and_rearms() {
        let state = AlertState::new();
        let pir = MotionMonitor::new();
        assert!(!pir.take_rearm());

        let warmup = pir.on_interrupt(&state, 1);
        assert_eq!(warmup.outcome, TriggerOutcome::Suppressed(SystemPhase::Initializing));
        assert!(warmup.wake);
        assert!(pir.take_rearm());
        assert!(!pir.take_rearm());

        assert!(state.complete_setup());
        let motion = pir.on_interrupt(&state, 2);
        assert_eq!(motion, EdgeReport { outcome: TriggerOutcome::Accepted, wake: true });
        assert!(pir.take_rearm());
        assert_eq!(state.mailbox().take(), Some(AlertEvent::motion(2)));
    }

    #[test]
    fn edges_inside_the_window_keep_the_line_alive() {
        let state = AlertState::with_flags(IDLE);
        let pir = MotionMonitor::new();
        assert!(pir.on_interrupt(&state, 10).outcome.is_accepted());
        assert!(pir.take_rearm());

        for at in 11..14 {
            let retrigger = pir.on_interrupt(&state, at);
            assert_eq!(retrigger.outcome, TriggerOutcome::Suppressed(SystemPhase::Alerting));
            assert!(retrigger.wake);
        }
        assert!(pir.take_rearm());
        assert_eq!(pir.edge_count(), 4);
    }
}
