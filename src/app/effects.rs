//! Alarm light-and-sound sequence and the idle heartbeat.
//!
//! The alarm is a fixed table of steps played start to finish on the
//! [`ToneDriver`]; flags are not consulted while it runs.
//!
//! ```text
//!  x3 ┌ red 150 ms ─ A 800 Hz 200 ms ─ B 800 Hz 200 ms ─ gap 100 ms
//!     └ red 150 ms ─ A 1600 Hz 200 ms ─ B 1600 Hz 200 ms ─ gap 150 ms
//!  then 250 ms trailing pause
//! ```

use embedded_hal::delay::DelayNs;

use crate::app::ports::{PwmOutput, PwmPort};
use crate::drivers::tone::ToneDriver;
use crate::pins::INDICATOR_PWM_FREQ_HZ;

pub const ALERT_BLINK_MS: u32 = 150;
pub const IDLE_BLINK_MS: u32 = 300;
pub const IDLE_BRIGHTNESS_PERCENT: u8 = 50;
pub const TONE_MS: u32 = 200;
pub const LOW_TONE_HZ: u32 = 800;
pub const HIGH_TONE_HZ: u32 = 1_600;
pub const LOW_GAP_MS: u32 = 100;
pub const HIGH_GAP_MS: u32 = 150;
pub const REPETITIONS: usize = 3;
pub const TRAILING_PAUSE_MS: u32 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Off(PwmOutput),
    Blink { output: PwmOutput, brightness_percent: u8, ms: u32 },
    Tone { output: PwmOutput, frequency_hz: u32, ms: u32 },
    Pause(u32),
}

const PHRASE_LEN: usize = 4;
/// Nominal LED off, the repeated phrases, trailing pause.
pub const SEQUENCE_LEN: usize = 1 + REPETITIONS * 2 * PHRASE_LEN + 1;

const fn phrase(frequency_hz: u32, gap_ms: u32) -> [Step; PHRASE_LEN] {
    [
        Step::Blink { output: PwmOutput::AlertLed, brightness_percent: 100, ms: ALERT_BLINK_MS },
        Step::Tone { output: PwmOutput::BuzzerA, frequency_hz, ms: TONE_MS },
        Step::Tone { output: PwmOutput::BuzzerB, frequency_hz, ms: TONE_MS },
        Step::Pause(gap_ms),
    ]
}

const fn build_sequence() -> [Step; SEQUENCE_LEN] {
    let low = phrase(LOW_TONE_HZ, LOW_GAP_MS);
    let high = phrase(HIGH_TONE_HZ, HIGH_GAP_MS);

    let mut out = [Step::Pause(0); SEQUENCE_LEN];
    out[0] = Step::Off(PwmOutput::NominalLed);
    let mut i = 1;
    let mut rep = 0;
    while rep < REPETITIONS {
        let mut j = 0;
        while j < PHRASE_LEN {
            out[i] = low[j];
            out[i + PHRASE_LEN] = high[j];
            i += 1;
            j += 1;
        }
        i += PHRASE_LEN;
        rep += 1;
    }
    out[i] = Step::Pause(TRAILING_PAUSE_MS);
    out
}

pub const ALARM_SEQUENCE: [Step; SEQUENCE_LEN] = build_sequence();

/// Wall time one pass of `steps` blocks for.
pub fn sequence_duration_ms(steps: &[Step]) -> u32 {
    steps
        .iter()
        .map(|s| match *s {
            Step::Off(_) => 0,
            Step::Blink { ms, .. } | Step::Tone { ms, .. } | Step::Pause(ms) => ms,
        })
        .sum()
}

pub fn play<P: PwmPort, D: DelayNs>(tone: &mut ToneDriver<'_, P, D>, steps: &[Step]) {
    for step in steps {
        match *step {
            Step::Off(output) => tone.off(output),
            Step::Blink { output, brightness_percent, ms } => {
                tone.blink(output, INDICATOR_PWM_FREQ_HZ, brightness_percent, ms);
            }
            Step::Tone { output, frequency_hz, ms } => tone.tone(output, frequency_hz, ms),
            Step::Pause(ms) => tone.pause(ms),
        }
    }
}

pub fn play_alarm<P: PwmPort, D: DelayNs>(tone: &mut ToneDriver<'_, P, D>) {
    play(tone, &ALARM_SEQUENCE);
}

/// Alert LED off, one soft pulse of the nominal LED.
pub fn idle_pulse<P: PwmPort, D: DelayNs>(tone: &mut ToneDriver<'_, P, D>) {
    tone.off(PwmOutput::AlertLed);
    tone.blink(PwmOutput::NominalLed, INDICATOR_PWM_FREQ_HZ, IDLE_BRIGHTNESS_PERCENT, IDLE_BLINK_MS);
}
