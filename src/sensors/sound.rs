//! Electret microphone sound-level monitor.
//!
//! Polled every 200 ms from the timer task.  Outside Idle the tick is a
//! no-op (the ADC is not even sampled); in Idle a sample strictly above the
//! threshold is offered to the shared [`AlertState`] as a sound event.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the microphone ADC1 channel via the oneshot API
//! (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

use core::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use crate::app::ports::SoundLevelPort;
use crate::events::{AlertEvent, TriggerOutcome};
use crate::fsm::{AlertState, SystemPhase};

#[cfg(not(target_os = "espidf"))]
static SIM_MIC_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_mic_adc(raw: u16) {
    SIM_MIC_ADC.store(raw, Ordering::Relaxed);
}

// ── ADC source ────────────────────────────────────────────────

/// The board microphone.
pub struct Microphone;

impl SoundLevelPort for Microphone {
    #[cfg(target_os = "espidf")]
    fn sample(&mut self) -> u16 {
        crate::drivers::hw_init::adc1_read(crate::pins::MIC_ADC1_CHANNEL)
    }

    #[cfg(not(target_os = "espidf"))]
    fn sample(&mut self) -> u16 {
        SIM_MIC_ADC.load(Ordering::Relaxed)
    }
}

// ── Monitor ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Guard closed; the microphone was not sampled.
    Skipped(SystemPhase),
    Quiet(u16),
    Loud { level: u16, outcome: TriggerOutcome },
}

pub struct SoundMonitor {
    threshold: AtomicU16,
    samples: AtomicU32,
}

impl SoundMonitor {
    pub const fn new(threshold: u16) -> Self {
        Self { threshold: AtomicU16::new(threshold), samples: AtomicU32::new(0) }
    }

    pub fn set_threshold(&self, threshold: u16) {
        self.threshold.store(threshold, Ordering::Relaxed);
    }

    pub fn threshold(&self) -> u16 {
        self.threshold.load(Ordering::Relaxed)
    }

    /// Samples taken since boot.
    pub fn sample_count(&self) -> u32 {
        self.samples.load(Ordering::Relaxed)
    }

    /// One poll tick.
    pub fn poll(
        &self,
        state: &AlertState,
        mic: &mut impl SoundLevelPort,
        now_ms: u32,
    ) -> PollOutcome {
        if !state.flags().accepts_trigger() {
            return PollOutcome::Skipped(state.phase());
        }

        let level = mic.sample();
        self.samples.fetch_add(1, Ordering::Relaxed);
        if level > self.threshold() {
            let outcome = state.submit(AlertEvent::sound(level, now_ms));
            PollOutcome::Loud { level, outcome }
        } else {
            PollOutcome::Quiet(level)
        }
    }
}

/// The instance the poll timer reports into.  Threshold is replaced from
/// config at boot.
pub static SOUND_MONITOR: SoundMonitor = SoundMonitor::new(2500);
