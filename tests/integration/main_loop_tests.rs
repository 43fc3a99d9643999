//! Main loop branches against mock PWM, display and delay.

use intrusion_alert::alarm;
use intrusion_alert::app::effects::{ALARM_SEQUENCE, sequence_duration_ms};
use intrusion_alert::app::main_loop::{
    ALERT_HOLD_MS, ALERT_TEXT, LOOP_PAUSE_MS, LoopBranch, MainLoop, NOMINAL_TEXT,
};
use intrusion_alert::app::ports::PwmOutput;
use intrusion_alert::fsm::AlertState;
use intrusion_alert::fsm::flags::FlagSnapshot;

use crate::mock_hw::{DisplayCall, MockDelay, MockDisplay, MockPwm, PwmCall, RecordingSink};

fn flags(alarm_active: bool, sending: bool) -> FlagSnapshot {
    FlagSnapshot { initializing: false, alarm_active, sending }
}

struct Rig {
    pwm: MockPwm,
    display: MockDisplay,
    delay: MockDelay,
}

impl Rig {
    fn run(state: &AlertState) -> (LoopBranch, Self) {
        let mut rig =
            Self { pwm: MockPwm::default(), display: MockDisplay::default(), delay: MockDelay::default() };
        let branch = MainLoop::new(state).iterate(&mut rig.pwm, &mut rig.display, &mut rig.delay);
        (branch, rig)
    }
}

#[test]
fn idle_iteration_shows_status_and_pulses_green() {
    let state = AlertState::with_flags(flags(false, false));
    let (branch, rig) = Rig::run(&state);

    assert_eq!(branch, LoopBranch::Nominal);
    assert_eq!(rig.display.calls, vec![DisplayCall::Text { x: 8, y: 0, text: NOMINAL_TEXT.into() }]);
    assert_eq!(
        rig.pwm.calls,
        vec![
            PwmCall::Stop(PwmOutput::AlertLed),
            PwmCall::Start { output: PwmOutput::NominalLed, frequency_hz: 10_000, duty_percent: 50 },
            PwmCall::Stop(PwmOutput::NominalLed),
        ]
    );
    assert_eq!(rig.delay.waits_ms, vec![300, LOOP_PAUSE_MS]);
}

#[test]
fn alert_iteration_plays_the_full_sequence() {
    let state = AlertState::with_flags(flags(true, false));
    let (branch, rig) = Rig::run(&state);

    assert_eq!(branch, LoopBranch::Alert);
    assert_eq!(
        rig.display.calls,
        vec![DisplayCall::Text { x: 8, y: 16, text: ALERT_TEXT.into() }, DisplayCall::Clear]
    );
    assert_eq!(
        rig.delay.total_ms(),
        sequence_duration_ms(&ALARM_SEQUENCE) + ALERT_HOLD_MS + LOOP_PAUSE_MS
    );
    assert_eq!(rig.delay.total_ms(), 5_000);
    assert_eq!(rig.pwm.calls[0], PwmCall::Stop(PwmOutput::NominalLed));
    assert_eq!(rig.pwm.starts_of(PwmOutput::AlertLed), 6);
    assert_eq!(rig.pwm.starts_of(PwmOutput::BuzzerA), 6);
    assert_eq!(rig.pwm.starts_of(PwmOutput::BuzzerB), 6);
    assert_eq!(rig.pwm.starts_of(PwmOutput::NominalLed), 0);
    assert!(PwmOutput::ALL.iter().all(|o| !rig.pwm.is_on(*o)));
}

#[test]
fn sending_alone_selects_the_alert_branch() {
    let state = AlertState::with_flags(flags(false, true));
    let (branch, rig) = Rig::run(&state);
    assert_eq!(branch, LoopBranch::Alert);
    assert!(rig.display.showed(ALERT_TEXT));
}

#[test]
fn branch_follows_the_flags_between_iterations() {
    let state = AlertState::with_flags(flags(true, false));
    assert_eq!(Rig::run(&state).0, LoopBranch::Alert);

    assert!(alarm::on_expired(state.flags(), &mut RecordingSink::default()));
    let (branch, rig) = Rig::run(&state);
    assert_eq!(branch, LoopBranch::Nominal);
    assert!(!rig.display.showed(ALERT_TEXT));
}
