//! Fuzz target: `AlertState` trigger guard and mailbox
//!
//! Each input byte is one operation against a shared state: setup, motion
//! edge, sound sample, mailbox take, alarm expiry.  Verifies:
//! - No panics under arbitrary operation sequences
//! - At most one event is accepted per alarm window
//! - Nothing is accepted before setup completes
//! - A taken event is always the one that was accepted
//!
//! cargo fuzz run fuzz_alert_state

#![no_main]

use intrusion_alert::alarm;
use intrusion_alert::app::events::AppEvent;
use intrusion_alert::app::ports::EventSink;
use intrusion_alert::events::{AlertEvent, TriggerOutcome};
use intrusion_alert::fsm::{AlertState, SystemPhase};
use libfuzzer_sys::fuzz_target;

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let state = AlertState::new();
    let mut accepted: Option<AlertEvent> = None;
    let mut in_window = 0u32;

    for (i, byte) in data.iter().enumerate() {
        let at = i as u32;
        match byte % 5 {
            0 => {
                state.complete_setup();
            }
            1 | 2 => {
                let event = if byte % 5 == 1 {
                    AlertEvent::motion(at)
                } else {
                    AlertEvent::sound(u16::from(*byte) * 16, at)
                };
                let was = state.phase();
                match state.submit(event) {
                    TriggerOutcome::Accepted => {
                        assert_eq!(was, SystemPhase::Idle);
                        in_window += 1;
                        assert!(in_window <= 1, "two triggers in one window");
                        accepted = Some(event);
                    }
                    TriggerOutcome::Suppressed(phase) => assert_ne!(phase, SystemPhase::Idle),
                    TriggerOutcome::Dropped => assert!(!state.flags().alarm_active()),
                }
            }
            3 => {
                let taken = state.mailbox().take();
                assert_eq!(taken, accepted.take());
            }
            _ => {
                if alarm::on_expired(state.flags(), &mut Discard) {
                    in_window = 0;
                }
            }
        }
        assert!(!state.flags().sending());
    }
});
