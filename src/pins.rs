//! GPIO / peripheral pin assignments for the alert controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Indicator, buzzer and I²C pins keep the
//! numbering of the prototype board; the microphone moved to GPIO 4 because
//! only GPIO 1–10 reach ADC1 on the ESP32-S3.

// ---------------------------------------------------------------------------
// Indicators (LEDC PWM)
// ---------------------------------------------------------------------------

/// Red LED: lit while the alarm window is open.
pub const ALERT_LED_GPIO: i32 = 13;
/// Green LED: breathing pulse while the system is idle.
pub const NOMINAL_LED_GPIO: i32 = 11;

// ---------------------------------------------------------------------------
// Buzzers (LEDC PWM, one timer each so both can hold a tone)
// ---------------------------------------------------------------------------

pub const BUZZER_A_GPIO: i32 = 10;
pub const BUZZER_B_GPIO: i32 = 21;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// HC-SR501 PIR output.  Pull-up, rising edge = motion.
pub const PIR_GPIO: i32 = 5;

/// Electret microphone module, analog envelope output.
/// ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const MIC_ADC_GPIO: i32 = 4;
pub const MIC_ADC1_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// I²C bus (SSD1306 OLED)
// ---------------------------------------------------------------------------

/// `main` takes these as `gpio14` / `gpio15`; keep the two in step.
pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 15;
/// 7-bit address of the SSD1306 module.
pub const OLED_I2C_ADDR: u8 = 0x3C;
pub const I2C_BAUD_HZ: u32 = 400_000;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  10 bits keeps 800 Hz .. 10 kHz reachable
/// from the 80 MHz APB clock.
pub const PWM_RESOLUTION_BITS: u32 = 10;
/// Carrier for the indicator LEDs (above flicker fusion).
pub const INDICATOR_PWM_FREQ_HZ: u32 = 10_000;
