//! One-shot hardware peripheral initialization.
//!
//! Configures the microphone ADC channel and the four LEDC timer/channel
//! pairs using raw ESP-IDF sys calls.  Called once from `main()` before
//! the timers and the PIR interrupt are armed.  The PIR input and the I²C
//! bus are owned through `esp-idf-hal` drivers in `main` instead.
//!
//! LEDC layout: one timer per output so each can hold its own frequency
//! (LEDs at 10 kHz, buzzers switching between 800 Hz and 1600 Hz).
//!
//! | Output      | Timer | Channel | GPIO |
//! |-------------|-------|---------|------|
//! | Alert LED   | 0     | 0       | 13   |
//! | Nominal LED | 1     | 1       | 11   |
//! | Buzzer A    | 2     | 2       | 10   |
//! | Buzzer B    | 3     | 3       | 21   |

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

use crate::app::ports::PwmOutput;
use crate::error::SetupError;
#[cfg(target_os = "espidf")]
use crate::pins;

/// GPIO wired to each LEDC channel, indexed by `PwmOutput as usize`.
#[cfg(target_os = "espidf")]
const LEDC_GPIOS: [i32; PwmOutput::COUNT] = [
    pins::ALERT_LED_GPIO,
    pins::NOMINAL_LED_GPIO,
    pins::BUZZER_A_GPIO,
    pins::BUZZER_B_GPIO,
];

/// Frequency each channel starts at.
#[cfg(target_os = "espidf")]
const LEDC_BOOT_FREQ_HZ: [u32; PwmOutput::COUNT] = [
    pins::INDICATOR_PWM_FREQ_HZ,
    pins::INDICATOR_PWM_FREQ_HZ,
    800,
    800,
];

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), SetupError> {
    // SAFETY: Called once from main() before any timer or ISR is armed.
    unsafe {
        init_adc()?;
        init_ledc()?;
    }
    info!("hw_init: ADC + LEDC configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), SetupError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: ADC1_HANDLE is written once in `init_adc()` before the sound
/// poll timer starts; afterwards only the timer task reads through it.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), SetupError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(SetupError::Peripheral(ret));
    }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::MIC_ADC1_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(SetupError::Peripheral(ret));
    }

    info!("hw_init: ADC1 CH{} (mic, GPIO{}) configured", pins::MIC_ADC1_CHANNEL, pins::MIC_ADC_GPIO);
    Ok(())
}

/// Read one raw sample.  A failed conversion reads as silence.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, written before any reader exists.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.clamp(0, i32::from(crate::config::ADC_FULL_SCALE)) as u16
}

// ── LEDC PWM ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_ledc() -> Result<(), SetupError> {
    for (i, (&gpio, &freq_hz)) in LEDC_GPIOS.iter().zip(LEDC_BOOT_FREQ_HZ.iter()).enumerate() {
        let timer = ledc_timer_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            timer_num: ledc_timer_t_LEDC_TIMER_0 + i as u32,
            duty_resolution: ledc_timer_bit_t_LEDC_TIMER_10_BIT,
            freq_hz,
            clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
            ..Default::default()
        };
        // SAFETY: single main-task context via init_peripherals().
        let ret = unsafe { ledc_timer_config(&timer) };
        if ret != ESP_OK as i32 {
            return Err(SetupError::Peripheral(ret));
        }

        let channel = ledc_channel_config_t {
            speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
            channel: ledc_channel_t_LEDC_CHANNEL_0 + i as u32,
            timer_sel: ledc_timer_t_LEDC_TIMER_0 + i as u32,
            gpio_num: gpio,
            duty: 0,
            hpoint: 0,
            ..Default::default()
        };
        let ret = unsafe { ledc_channel_config(&channel) };
        if ret != ESP_OK as i32 {
            return Err(SetupError::Peripheral(ret));
        }
    }

    info!("hw_init: LEDC configured (alert=CH0, nominal=CH1, buzzer A=CH2, buzzer B=CH3)");
    Ok(())
}

/// Retune the timer behind `output`.
#[cfg(target_os = "espidf")]
pub fn ledc_set_freq(output: PwmOutput, freq_hz: u32) -> Result<(), i32> {
    // SAFETY: timers were configured in init_ledc(); only the main loop
    // drives the LEDC after boot.
    let ret = unsafe {
        esp_idf_svc::sys::ledc_set_freq(ledc_mode_t_LEDC_LOW_SPEED_MODE, ledc_timer_t_LEDC_TIMER_0 + output as u32, freq_hz)
    };
    if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set_freq(_output: PwmOutput, _freq_hz: u32) -> Result<(), i32> {
    Ok(())
}

/// Write a raw duty count to the channel behind `output`.
#[cfg(target_os = "espidf")]
pub fn ledc_set_duty(output: PwmOutput, duty: u32) {
    // SAFETY: see ledc_set_freq().
    unsafe {
        esp_idf_svc::sys::ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, output as u32, duty);
        esp_idf_svc::sys::ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, output as u32);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn ledc_set_duty(_output: PwmOutput, _duty: u32) {}
