//! LEDC-backed [`PwmPort`] for the two indicator LEDs and the two buzzers.
//!
//! Each output owns a dedicated LEDC timer, so retuning a buzzer never
//! disturbs the 10 kHz LED carrier.  The timer is only retuned when the
//! requested frequency differs from the one already programmed.

use log::warn;

use crate::app::ports::{PwmOutput, PwmPort};
use crate::drivers::hw_init;
use crate::pins::PWM_RESOLUTION_BITS;

/// Convert a 0–100 % duty into LEDC counts at `bits` resolution.
pub fn duty_counts(bits: u32, percent: u8) -> u32 {
    let max = (1u32 << bits) - 1;
    max * u32::from(percent.min(100)) / 100
}

/// What one output is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drive {
    pub frequency_hz: u32,
    pub duty_percent: u8,
}

pub struct LedcOutputs {
    programmed_hz: [u32; PwmOutput::COUNT],
    active: [Option<Drive>; PwmOutput::COUNT],
}

impl Default for LedcOutputs {
    fn default() -> Self {
        Self::new()
    }
}

impl LedcOutputs {
    /// Wrap channels already configured by `hw_init::init_peripherals()`.
    pub fn new() -> Self {
        Self { programmed_hz: [0; PwmOutput::COUNT], active: [None; PwmOutput::COUNT] }
    }

    pub fn active(&self, output: PwmOutput) -> Option<Drive> {
        self.active[output as usize]
    }

    pub fn all_off(&mut self) {
        for output in PwmOutput::ALL {
            self.stop(output);
        }
    }
}

impl PwmPort for LedcOutputs {
    fn start(&mut self, output: PwmOutput, frequency_hz: u32, duty_percent: u8) {
        let idx = output as usize;
        if self.programmed_hz[idx] != frequency_hz {
            match hw_init::ledc_set_freq(output, frequency_hz) {
                Ok(()) => self.programmed_hz[idx] = frequency_hz,
                Err(rc) => {
                    warn!("ledc: {:?} cannot run at {} Hz (rc={})", output, frequency_hz, rc);
                    return;
                }
            }
        }
        hw_init::ledc_set_duty(output, duty_counts(PWM_RESOLUTION_BITS, duty_percent));
        self.active[idx] = Some(Drive { frequency_hz, duty_percent });
    }

    fn stop(&mut self, output: PwmOutput) {
        hw_init::ledc_set_duty(output, 0);
        self.active[output as usize] = None;
    }
}
