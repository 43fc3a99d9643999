//! Wi-Fi station-mode adapter.
//!
//! Joins the configured access point once at boot, bounded by
//! `wifi_connect_timeout_ms`.  A failed join is logged and the controller
//! carries on degraded: the MQTT supervisor keeps retrying on its own.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi::BlockingWifi` over `EspWifi`.
//! - **all other targets**: a simulated link for host-side tests.

use core::fmt;
use log::{error, info};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::config::SystemConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityError {
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    Timeout,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::ConnectionFailed => write!(f, "Wi-Fi connection failed"),
            Self::Timeout => write!(f, "Wi-Fi connection timed out"),
        }
    }
}

impl From<ConnectivityError> for CommsError {
    fn from(e: ConnectivityError) -> Self {
        match e {
            ConnectivityError::Timeout => CommsError::WifiTimeout,
            _ => CommsError::WifiConnectFailed,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

/// Empty means an open network.
pub fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// Link
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected { ip: [u8; 4] },
    Failed(ConnectivityError),
}

pub struct WifiLink {
    state: WifiState,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    /// Simulation: whether the access point answers.
    #[cfg(not(target_os = "espidf"))]
    sim_reachable: bool,
}

impl WifiLink {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: BlockingWifi<EspWifi<'static>>) -> Self {
        Self { state: WifiState::Disconnected, wifi }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim(reachable: bool) -> Self {
        Self { state: WifiState::Disconnected, sim_reachable: reachable }
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, WifiState::Connected { .. })
    }

    /// Join the configured network, reporting progress through `sink`.
    pub fn join(
        &mut self,
        config: &SystemConfig,
        sink: &mut impl EventSink,
    ) -> Result<[u8; 4], ConnectivityError> {
        sink.emit(&AppEvent::WifiConnecting);

        let result = validate_ssid(&config.wifi_ssid)
            .and_then(|()| validate_password(&config.wifi_passphrase))
            .and_then(|()| self.platform_join(config));

        match result {
            Ok(ip) => {
                self.state = WifiState::Connected { ip };
                info!("Wi-Fi: joined '{}'", config.wifi_ssid);
                sink.emit(&AppEvent::WifiConnected { ip });
                Ok(ip)
            }
            Err(e) => {
                error!("Wi-Fi: {}", e);
                self.state = WifiState::Failed(e);
                sink.emit(&AppEvent::WifiFailed(e.into()));
                Err(e)
            }
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_join(&mut self, config: &SystemConfig) -> Result<[u8; 4], ConnectivityError> {
        use core::time::Duration;
        use esp_idf_svc::sys::{ESP_ERR_TIMEOUT, EspError};
        use std::time::Instant;

        let classify = |e: EspError| {
            if e.code() == ESP_ERR_TIMEOUT as i32 {
                ConnectivityError::Timeout
            } else {
                log::warn!("Wi-Fi: driver error {}", e);
                ConnectivityError::ConnectionFailed
            }
        };

        let auth_method = if config.wifi_passphrase.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client = ClientConfiguration {
            ssid: config.wifi_ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: config
                .wifi_passphrase
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        };

        self.wifi.set_configuration(&Configuration::Client(client)).map_err(classify)?;
        if !self.wifi.is_started().map_err(classify)? {
            self.wifi.start().map_err(classify)?;
        }

        let budget = Duration::from_millis(u64::from(config.wifi_connect_timeout_ms));
        let started = Instant::now();

        self.wifi.wifi_mut().connect().map_err(classify)?;
        self.wifi
            .wifi_wait_while(|| self.wifi.is_connected().map(|c| !c), Some(budget))
            .map_err(classify)?;

        let remaining = budget.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(ConnectivityError::Timeout);
        }
        self.wifi
            .ip_wait_while(|| self.wifi.is_up().map(|up| !up), Some(remaining))
            .map_err(classify)?;

        let ip_info = self.wifi.wifi().sta_netif().get_ip_info().map_err(classify)?;
        Ok(ip_info.ip.octets())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_join(&mut self, config: &SystemConfig) -> Result<[u8; 4], ConnectivityError> {
        if !self.sim_reachable {
            return Err(ConnectivityError::Timeout);
        }
        info!("Wi-Fi(sim): associated with '{}'", config.wifi_ssid);
        Ok([192, 168, 100, 50])
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
