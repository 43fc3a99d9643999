//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AlertService / MainLoop (domain)
//! ```
//!
//! Drivers and adapters (LEDC, OLED, ADC, MQTT, esp_timer, logger)
//! implement these traits.  The domain consumes them via generics injected
//! at call sites, so the core never touches hardware directly and every
//! path runs on the host against recording mocks.

use std::sync::{Arc, Mutex};

use crate::error::{CommsError, TimerError};

// ───────────────────────────────────────────────────────────────
// Display port (domain → OLED)
// ───────────────────────────────────────────────────────────────

/// Two-line status display.  Each call renders and flushes.
pub trait DisplayPort {
    fn clear(&mut self);

    /// Draw `text` with its top-left corner at pixel (`x`, `y`).
    fn draw_text(&mut self, x: i32, y: i32, text: &str);
}

/// The alert task and the main loop share one physical display.
impl<T: DisplayPort> DisplayPort for Arc<Mutex<T>> {
    fn clear(&mut self) {
        if let Ok(mut d) = self.lock() {
            d.clear();
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        if let Ok(mut d) = self.lock() {
            d.draw_text(x, y, text);
        }
    }
}

/// A panel that failed to initialise: the controller runs without it.
impl<T: DisplayPort> DisplayPort for Option<T> {
    fn clear(&mut self) {
        if let Some(d) = self {
            d.clear();
        }
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        if let Some(d) = self {
            d.draw_text(x, y, text);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// PWM port (domain → LEDs and buzzers)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PwmOutput {
    /// Red LED.
    AlertLed = 0,
    /// Green LED.
    NominalLed = 1,
    BuzzerA = 2,
    BuzzerB = 3,
}

impl PwmOutput {
    pub const COUNT: usize = 4;
    pub const ALL: [Self; Self::COUNT] =
        [Self::AlertLed, Self::NominalLed, Self::BuzzerA, Self::BuzzerB];
}

pub trait PwmPort {
    /// Drive `output` at `frequency_hz` with `duty_percent` (0–100) on-time.
    fn start(&mut self, output: PwmOutput, frequency_hz: u32, duty_percent: u8);

    /// Force the output low.
    fn stop(&mut self, output: PwmOutput);
}

// ───────────────────────────────────────────────────────────────
// Sound level port (ADC → domain)
// ───────────────────────────────────────────────────────────────

pub trait SoundLevelPort {
    /// One raw 12-bit sample of the microphone envelope.
    fn sample(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// MQTT port (domain → broker)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QoS {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

/// The single connection handle to the broker.
pub trait MqttPort {
    /// (Re)issue the connect call.  Replaces any existing session; the
    /// outcome arrives later as a connection status.
    fn connect(&mut self) -> Result<(), CommsError>;

    /// Whether a client exists and the broker accepted its session.
    fn is_connected(&self) -> bool;

    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS, retain: bool)
        -> Result<(), CommsError>;
}

impl<T: MqttPort> MqttPort for Arc<Mutex<T>> {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.lock().map_err(|_| CommsError::MqttClientCreateFailed)?.connect()
    }

    fn is_connected(&self) -> bool {
        self.lock().map(|link| link.is_connected()).unwrap_or(false)
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), CommsError> {
        self.lock()
            .map_err(|_| CommsError::MqttPublishFailed)?
            .publish(topic, payload, qos, retain)
    }
}

// ───────────────────────────────────────────────────────────────
// Timing ports
// ───────────────────────────────────────────────────────────────

/// One-shot deadline whose expiry handler is bound when the timer is built.
pub trait OneShotTimer {
    fn start_once(&mut self, after_ms: u32) -> Result<(), TimerError>;
}

/// Monotonic milliseconds since boot.
pub trait Clock {
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → console log)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
