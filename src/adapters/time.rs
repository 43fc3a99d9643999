//! ESP32 time adapter.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` (microsecond
//!   precision, monotonic, safe from interrupt context).
//! - **`not(target_os = "espidf")`**: `std::time::Instant` from first use.

use crate::app::ports::Clock;

#[cfg(not(target_os = "espidf"))]
static SIM_EPOCH: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn uptime_us() -> u64 {
    // SAFETY: esp_timer_get_time has no preconditions and is ISR-safe.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
}

#[cfg(not(target_os = "espidf"))]
pub fn uptime_us() -> u64 {
    SIM_EPOCH.get_or_init(std::time::Instant::now).elapsed().as_micros() as u64
}

/// Wrapping 32-bit milliseconds, for timestamps taken in interrupt context
/// (Xtensa has no 64-bit atomics).  Wraps after ~49.7 days.
pub fn uptime_ms32() -> u32 {
    (uptime_us() / 1_000) as u32
}

/// Time adapter for the ESP32-S3 platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct Esp32TimeAdapter;

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32TimeAdapter {
    fn uptime_ms(&self) -> u64 {
        uptime_us() / 1_000
    }
}
