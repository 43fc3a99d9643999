//! Mock hardware adapters for integration tests.
//!
//! Records every port call so tests can assert on the full command
//! history without touching real LEDC, I²C or MQTT.

use embedded_hal::delay::DelayNs;
use intrusion_alert::app::events::AppEvent;
use intrusion_alert::app::ports::{
    Clock, DisplayPort, EventSink, MqttPort, OneShotTimer, PwmOutput, PwmPort, QoS,
};
use intrusion_alert::error::{CommsError, TimerError};

// ── PWM ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PwmCall {
    Start { output: PwmOutput, frequency_hz: u32, duty_percent: u8 },
    Stop(PwmOutput),
}

#[derive(Default)]
pub struct MockPwm {
    pub calls: Vec<PwmCall>,
}

#[allow(dead_code)]
impl MockPwm {
    pub fn starts_of(&self, output: PwmOutput) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, PwmCall::Start { output: o, .. } if *o == output))
            .count()
    }

    /// Whether `output` was left driven after the last call.
    pub fn is_on(&self, output: PwmOutput) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                PwmCall::Start { output: o, .. } if *o == output => Some(true),
                PwmCall::Stop(o) if *o == output => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }
}

impl PwmPort for MockPwm {
    fn start(&mut self, output: PwmOutput, frequency_hz: u32, duty_percent: u8) {
        self.calls.push(PwmCall::Start { output, frequency_hz, duty_percent });
    }

    fn stop(&mut self, output: PwmOutput) {
        self.calls.push(PwmCall::Stop(output));
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Clear,
    Text { x: i32, y: i32, text: String },
}

#[derive(Default)]
pub struct MockDisplay {
    pub calls: Vec<DisplayCall>,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Text { text, .. } => Some(text.as_str()),
                DisplayCall::Clear => None,
            })
            .collect()
    }

    pub fn showed(&self, needle: &str) -> bool {
        self.texts().contains(&needle)
    }
}

impl DisplayPort for MockDisplay {
    fn clear(&mut self) {
        self.calls.push(DisplayCall::Clear);
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) {
        self.calls.push(DisplayCall::Text { x, y, text: text.into() });
    }
}

// ── MQTT ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub qos: QoS,
    pub retain: bool,
}

/// Broker stand-in.  Connect calls succeed unless `create_failures` is
/// non-zero; statuses are fed to the supervisor by the test.
#[derive(Default)]
pub struct MockLink {
    pub connected: bool,
    pub connect_calls: u32,
    pub create_failures: u32,
    pub publish_error: Option<CommsError>,
    pub published: Vec<Published>,
    /// Runs inside `publish`, before it returns.
    pub during_publish: Option<Box<dyn FnMut()>>,
}

#[allow(dead_code)]
impl MockLink {
    pub fn connected() -> Self {
        Self { connected: true, ..Self::default() }
    }
}

impl MqttPort for MockLink {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.connect_calls += 1;
        self.connected = false;
        if self.create_failures > 0 {
            self.create_failures -= 1;
            return Err(CommsError::MqttClientCreateFailed);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), CommsError> {
        if let Some(hook) = self.during_publish.as_mut() {
            hook();
        }
        if let Some(e) = self.publish_error {
            return Err(e);
        }
        self.published.push(Published {
            topic: topic.into(),
            payload: String::from_utf8_lossy(payload).into_owned(),
            qos,
            retain,
        });
        Ok(())
    }
}

// ── Timer / clock / delay ─────────────────────────────────────

#[derive(Default)]
pub struct MockTimer {
    pub started: Vec<u32>,
    pub fail: Option<TimerError>,
}

impl OneShotTimer for MockTimer {
    fn start_once(&mut self, after_ms: u32) -> Result<(), TimerError> {
        if let Some(e) = self.fail {
            return Err(e);
        }
        self.started.push(after_ms);
        Ok(())
    }
}

pub struct MockClock(pub u64);

impl Clock for MockClock {
    fn uptime_ms(&self) -> u64 {
        self.0
    }
}

#[derive(Default)]
pub struct MockDelay {
    pub waits_ms: Vec<u32>,
}

#[allow(dead_code)]
impl MockDelay {
    pub fn total_ms(&self) -> u32 {
        self.waits_ms.iter().sum()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits_ms.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits_ms.push(ms);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.events.iter().map(|e| e.to_string()).collect()
    }

    pub fn count(&self, event: &AppEvent) -> usize {
        self.events.iter().filter(|e| *e == event).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

