//! Tone / blink driver.
//!
//! Drives one PWM output at a frequency and duty for a bounded time, then
//! forces it low.  Every call blocks for its full duration on the supplied
//! `embedded_hal` delay.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::app::ports::{PwmOutput, PwmPort};

/// Buzzers are always driven with a square wave.
pub const TONE_DUTY_PERCENT: u8 = 50;

pub struct ToneDriver<'a, P, D> {
    pwm: &'a mut P,
    delay: &'a mut D,
}

impl<'a, P: PwmPort, D: DelayNs> ToneDriver<'a, P, D> {
    pub fn new(pwm: &'a mut P, delay: &'a mut D) -> Self {
        Self { pwm, delay }
    }

    /// Light `output` at `brightness_percent` for `on_ms`, then switch it off.
    pub fn blink(&mut self, output: PwmOutput, frequency_hz: u32, brightness_percent: u8, on_ms: u32) {
        self.pulse(output, frequency_hz, brightness_percent.min(100), on_ms);
    }

    /// Sound `output` at `frequency_hz` for `duration_ms`.
    pub fn tone(&mut self, output: PwmOutput, frequency_hz: u32, duration_ms: u32) {
        self.pulse(output, frequency_hz, TONE_DUTY_PERCENT, duration_ms);
    }

    pub fn off(&mut self, output: PwmOutput) {
        self.pwm.stop(output);
    }

    pub fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn pulse(&mut self, output: PwmOutput, frequency_hz: u32, duty_percent: u8, ms: u32) {
        if frequency_hz == 0 {
            // Nothing to drive; keep the timing so sequences stay aligned.
            warn!("tone: zero frequency on {:?}, holding output low", output);
            self.pwm.stop(output);
        } else {
            self.pwm.start(output, frequency_hz, duty_percent);
        }
        self.delay.delay_ms(ms);
        self.pwm.stop(output);
    }
}
