//! System configuration parameters
//!
//! All tunable parameters for the intrusion alert controller, passed to
//! every component at startup.  Defaults reproduce the values the deployed
//! devices shipped with; network credentials can be overridden at build
//! time through a `.env` file (see `build.rs`).

use core::fmt;

use serde::{Deserialize, Serialize};

// ── Build-time overrides ──────────────────────────────────────

const fn env_or(value: Option<&'static str>, fallback: &'static str) -> &'static str {
    match value {
        Some(v) => v,
        None => fallback,
    }
}

/// Decimal port parser usable in const context.  Malformed input yields
/// `fallback`.
const fn parse_port(value: Option<&'static str>, fallback: u16) -> u16 {
    let Some(s) = value else {
        return fallback;
    };
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return fallback;
    }
    let mut acc: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if !b.is_ascii_digit() {
            return fallback;
        }
        acc = acc * 10 + (b - b'0') as u32;
        if acc > u16::MAX as u32 {
            return fallback;
        }
        i += 1;
    }
    acc as u16
}

const FACTORY_WIFI_SSID: &str = "teste";
const FACTORY_WIFI_PASS: &str = "teste123";
const FACTORY_BROKER_HOST: &str = "192.168.100.121";
const FACTORY_BROKER_PORT: u16 = 1883;
const FACTORY_CLIENT_ID: &str = "pico_client";
const FACTORY_DEVICE_NAME: &str = "X";

const DEFAULT_WIFI_SSID: &str = env_or(option_env!("ALERT_WIFI_SSID"), FACTORY_WIFI_SSID);
const DEFAULT_WIFI_PASS: &str = env_or(option_env!("ALERT_WIFI_PASS"), FACTORY_WIFI_PASS);
const DEFAULT_BROKER_HOST: &str = env_or(option_env!("ALERT_BROKER_HOST"), FACTORY_BROKER_HOST);
const DEFAULT_BROKER_PORT: u16 = parse_port(option_env!("ALERT_BROKER_PORT"), FACTORY_BROKER_PORT);
const DEFAULT_CLIENT_ID: &str = env_or(option_env!("ALERT_CLIENT_ID"), FACTORY_CLIENT_ID);
const DEFAULT_DEVICE_NAME: &str = env_or(option_env!("ALERT_DEVICE_NAME"), FACTORY_DEVICE_NAME);

/// Full-scale reading of the 12-bit microphone ADC.
pub const ADC_FULL_SCALE: u16 = 4095;

// ── Reconnect policy ──────────────────────────────────────────

/// What the connection supervisor does after the broker rejects or drops
/// the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconnectPolicy {
    /// Re-issue the connect call on every non-accepted status, no delay.
    Immediate,
    /// Wait `initial_ms`, doubling after each consecutive failure up to
    /// `max_ms`.  Reset on the first accepted session.
    Backoff { initial_ms: u32, max_ms: u32 },
}

// ── SystemConfig ──────────────────────────────────────────────

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Wi-Fi ---
    pub wifi_ssid: heapless::String<32>,
    /// Never serialised; the boot-time config dump must not leak it.
    #[serde(skip_serializing, default)]
    pub wifi_passphrase: heapless::String<64>,
    /// Association timeout (milliseconds)
    pub wifi_connect_timeout_ms: u32,

    // --- MQTT ---
    pub broker_host: heapless::String<64>,
    pub broker_port: u16,
    /// MQTT 3.1 caps client identifiers at 23 bytes.
    pub client_id: heapless::String<23>,
    pub keep_alive_secs: u16,
    pub alert_topic: heapless::String<32>,
    /// Label embedded in the alert message ("no dispositivo <name>").
    pub device_name: heapless::String<16>,
    pub reconnect: ReconnectPolicy,

    // --- Sensors ---
    /// Raw ADC level above which a sound sample counts as an intrusion.
    pub sound_threshold: u16,
    /// Sound sampling period (milliseconds)
    pub sound_poll_interval_ms: u32,

    // --- Alarm ---
    /// How long the alarm window stays open after a trigger (milliseconds)
    pub alarm_duration_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Wi-Fi
            wifi_ssid: bounded(DEFAULT_WIFI_SSID),
            wifi_passphrase: bounded(DEFAULT_WIFI_PASS),
            wifi_connect_timeout_ms: 30_000,

            // MQTT
            broker_host: bounded(DEFAULT_BROKER_HOST),
            broker_port: DEFAULT_BROKER_PORT,
            client_id: bounded(DEFAULT_CLIENT_ID),
            keep_alive_secs: 60,
            alert_topic: bounded("Alerta"),
            device_name: bounded(DEFAULT_DEVICE_NAME),
            reconnect: ReconnectPolicy::Immediate,

            // Sensors
            sound_threshold: 2500,
            sound_poll_interval_ms: 200,

            // Alarm
            alarm_duration_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Built-in values with every build-time override ignored.  Used when
    /// the overridden config fails validation.
    pub fn factory() -> Self {
        Self {
            wifi_ssid: bounded(FACTORY_WIFI_SSID),
            wifi_passphrase: bounded(FACTORY_WIFI_PASS),
            broker_host: bounded(FACTORY_BROKER_HOST),
            broker_port: FACTORY_BROKER_PORT,
            client_id: bounded(FACTORY_CLIENT_ID),
            device_name: bounded(FACTORY_DEVICE_NAME),
            ..Self::default()
        }
    }

    /// Reject values that would leave the controller unable to alert.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wifi_ssid.is_empty() {
            return Err(ConfigError::ValidationFailed("wifi_ssid is empty"));
        }
        let pass_len = self.wifi_passphrase.len();
        if pass_len != 0 && pass_len < 8 {
            return Err(ConfigError::ValidationFailed("wifi_passphrase shorter than 8 bytes"));
        }
        if self.wifi_connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("wifi_connect_timeout_ms is zero"));
        }
        if self.broker_host.is_empty() {
            return Err(ConfigError::ValidationFailed("broker_host is empty"));
        }
        if self.broker_port == 0 {
            return Err(ConfigError::ValidationFailed("broker_port is zero"));
        }
        if self.client_id.is_empty() {
            return Err(ConfigError::ValidationFailed("client_id is empty"));
        }
        if self.keep_alive_secs == 0 {
            return Err(ConfigError::ValidationFailed("keep_alive_secs is zero"));
        }
        if self.alert_topic.is_empty() || self.alert_topic.contains(['+', '#']) {
            return Err(ConfigError::ValidationFailed("alert_topic is empty or has wildcards"));
        }
        if self.sound_threshold == 0 || self.sound_threshold >= ADC_FULL_SCALE {
            return Err(ConfigError::ValidationFailed("sound_threshold outside 1..4095"));
        }
        if self.sound_poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sound_poll_interval_ms is zero"));
        }
        if self.alarm_duration_ms == 0 {
            return Err(ConfigError::ValidationFailed("alarm_duration_ms is zero"));
        }
        if let ReconnectPolicy::Backoff { initial_ms, max_ms } = self.reconnect {
            if initial_ms == 0 || max_ms < initial_ms {
                return Err(ConfigError::ValidationFailed("reconnect backoff bounds inverted"));
            }
        }
        Ok(())
    }

    /// Broker URL in the form the MQTT client expects.
    pub fn broker_url(&self) -> heapless::String<80> {
        let mut url = heapless::String::new();
        // Capacity covers "mqtt://" + 64-byte host + ":65535".
        let _ = fmt::write(
            &mut url,
            format_args!("mqtt://{}:{}", self.broker_host, self.broker_port),
        );
        url
    }

    /// JSON rendering for the boot log.  The passphrase is not included.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string(self).map_err(|_| ConfigError::SerializationFailed)
    }
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    ValidationFailed(&'static str),
    SerializationFailed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(why) => write!(f, "validation failed: {why}"),
            Self::SerializationFailed => write!(f, "serialization failed"),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(why) => Self::Config(why),
            ConfigError::SerializationFailed => Self::Config("serialization failed"),
        }
    }
}

/// Copy `s` into a bounded string, truncating on a char boundary.
fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
