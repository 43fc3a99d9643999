//! Main loop observer.
//!
//! Each iteration reads the flags once and picks a branch:
//!
//! - `alarm_active || sending`: alert banner, full alarm sequence, clear,
//!   500 ms hold.
//! - otherwise: status banner, alert LED off, one nominal pulse.
//!
//! Both branches end with a fixed 200 ms pause.  A trigger landing during
//! an iteration is picked up on the next one.

use embedded_hal::delay::DelayNs;

use crate::app::effects;
use crate::app::ports::{DisplayPort, PwmPort};
use crate::drivers::tone::ToneDriver;
use crate::fsm::AlertState;

pub const ALERT_TEXT: &str = "Sistema em Alerta!";
pub const ALERT_TEXT_POS: (i32, i32) = (8, 16);
pub const NOMINAL_TEXT: &str = "Sistema Funcionando!";
pub const NOMINAL_TEXT_POS: (i32, i32) = (8, 0);
pub const ALERT_HOLD_MS: u32 = 500;
pub const LOOP_PAUSE_MS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBranch {
    Alert,
    Nominal,
}

pub struct MainLoop<'s> {
    state: &'s AlertState,
}

impl<'s> MainLoop<'s> {
    pub fn new(state: &'s AlertState) -> Self {
        Self { state }
    }

    pub fn iterate(
        &self,
        pwm: &mut impl PwmPort,
        display: &mut impl DisplayPort,
        delay: &mut impl DelayNs,
    ) -> LoopBranch {
        let flags = self.state.flags();
        let branch = if flags.alarm_active() || flags.sending() {
            display.draw_text(ALERT_TEXT_POS.0, ALERT_TEXT_POS.1, ALERT_TEXT);
            effects::play_alarm(&mut ToneDriver::new(pwm, delay));
            display.clear();
            delay.delay_ms(ALERT_HOLD_MS);
            LoopBranch::Alert
        } else {
            display.draw_text(NOMINAL_TEXT_POS.0, NOMINAL_TEXT_POS.1, NOMINAL_TEXT);
            effects::idle_pulse(&mut ToneDriver::new(pwm, delay));
            LoopBranch::Nominal
        };
        delay.delay_ms(LOOP_PAUSE_MS);
        branch
    }
}
