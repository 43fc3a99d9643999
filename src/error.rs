//! Unified error types for the intrusion alert firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! bootstrap path in `main` uniform.  All variants are `Copy` so they can be
//! handed across the alert task, timer callbacks and the main loop without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A peripheral or the radio could not be brought up.
    Setup(SetupError),
    /// Wi-Fi or MQTT failed.
    Comms(CommsError),
    /// A software timer could not be created or started.
    Timer(TimerError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup(e) => write!(f, "setup: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Setup errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// The Wi-Fi radio driver failed to initialise.
    RadioInitFailed,
    /// The OLED did not acknowledge its init sequence.
    DisplayInitFailed,
    /// A GPIO, ADC or LEDC call returned an ESP-IDF error code.
    Peripheral(i32),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RadioInitFailed => write!(f, "radio init failed"),
            Self::DisplayInitFailed => write!(f, "display init failed"),
            Self::Peripheral(rc) => write!(f, "peripheral init failed (rc={rc})"),
        }
    }
}

impl From<SetupError> for Error {
    fn from(e: SetupError) -> Self {
        Self::Setup(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    WifiConnectFailed,
    WifiTimeout,
    MqttClientCreateFailed,
    MqttNotConnected,
    MqttPublishFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
            Self::WifiTimeout => write!(f, "WiFi connect timed out"),
            Self::MqttClientCreateFailed => write!(f, "MQTT client creation failed"),
            Self::MqttNotConnected => write!(f, "MQTT not connected"),
            Self::MqttPublishFailed => write!(f, "MQTT publish failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Timer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    CreateFailed(i32),
    StartFailed(i32),
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFailed(rc) => write!(f, "timer create failed (rc={rc})"),
            Self::StartFailed(rc) => write!(f, "timer start failed (rc={rc})"),
        }
    }
}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
