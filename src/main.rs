//! Intrusion Alert Firmware: main entry point
//!
//! Hexagonal layout: pure logic in the library, hardware behind port traits.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  LedcOutputs   TextDisplay   MqttLink   LogEventSink   Clock   │
//! │  (PwmPort)     (DisplayPort) (MqttPort) (EventSink)            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  AlertState (flags + mailbox) · AlertService · MainLoop │    │
//! │  │  ConnectionSupervisor · AlarmWindow                    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  PIR ISR ─┐                                                    │
//! │           ├─▶ AlertMailbox ─▶ alert task (core 1)              │
//! │  sound ───┘                                                    │
//! │  timer                                                         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::num::NonZeroU32;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use esp_idf_hal::delay::{BLOCK, FreeRtos};
use esp_idf_hal::gpio::{Gpio5, InterruptType, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::task::notification::{Notification, Notifier};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{debug, error, info, warn};

use intrusion_alert::adapters::log_sink::LogEventSink;
use intrusion_alert::adapters::mqtt::MqttLink;
use intrusion_alert::adapters::time::{Esp32TimeAdapter, uptime_ms32};
use intrusion_alert::adapters::wifi::WifiLink;
use intrusion_alert::alarm;
use intrusion_alert::app::connection::ConnectionSupervisor;
use intrusion_alert::app::main_loop::MainLoop;
use intrusion_alert::app::ports::{Clock, DisplayPort};
use intrusion_alert::app::service::AlertService;
use intrusion_alert::config::SystemConfig;
use intrusion_alert::drivers::hw_init;
use intrusion_alert::drivers::hw_timer::{OneShot, TimerService};
use intrusion_alert::drivers::ledc::LedcOutputs;
use intrusion_alert::drivers::oled::{TextDisplay, ssd1306_panel};
use intrusion_alert::drivers::task_pin::{Core, spawn_on_core};
use intrusion_alert::drivers::watchdog::Watchdog;
use intrusion_alert::error::{Error, SetupError};
use intrusion_alert::events::TriggerOutcome;
use intrusion_alert::fsm::ALERT_STATE;
use intrusion_alert::pins;
use intrusion_alert::sensors::motion::MOTION_MONITOR;
use intrusion_alert::sensors::sound::{Microphone, PollOutcome, SOUND_MONITOR};

type SharedDisplay = Arc<Mutex<Option<TextDisplay<ssd1306_panel::Panel>>>>;
type SharedLink = Arc<Mutex<MqttLink>>;

const ALERT_TASK_PRIORITY: u8 = 5;
const ALERT_TASK_STACK_KB: usize = 8;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Intrusion Alert v{}               ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();
    let mut sink = LogEventSink::new();
    let clock = Esp32TimeAdapter::new();

    let peripherals = Peripherals::take().context("peripherals already taken")?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Peripherals ────────────────────────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {}; continuing without sound/PWM", e);
    }
    let mut pwm = LedcOutputs::new();
    pwm.all_off();

    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ));
    let panel = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio14,
        peripherals.pins.gpio15,
        &i2c_config,
    )
    .map_err(|e| {
        error!("I2C bus init failed: {}", e);
        SetupError::DisplayInitFailed
    })
    .and_then(ssd1306_panel::open);
    info!(
        "OLED on I2C0 (SDA GPIO{}, SCL GPIO{}, addr 0x{:02X})",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::OLED_I2C_ADDR
    );
    let mut display: SharedDisplay = Arc::new(Mutex::new(match panel {
        Ok(panel) => Some(panel),
        Err(e) => {
            error!("{}; running headless", Error::from(e));
            None
        }
    }));
    display.clear();

    // ── 3. Wi-Fi ──────────────────────────────────────────────
    let _wifi = match EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))
        .and_then(|wifi| BlockingWifi::wrap(wifi, sysloop.clone()))
    {
        Ok(wifi) => {
            let mut link = WifiLink::new(wifi);
            // Failure is logged by the link; MQTT keeps retrying regardless.
            let _ = link.join(&config, &mut sink);
            Some(link)
        }
        Err(e) => {
            error!("{} ({})", Error::from(SetupError::RadioInitFailed), e);
            None
        }
    };

    // ── 4. MQTT ───────────────────────────────────────────────
    let link = MqttLink::new(&config);
    let statuses = link.status_feed();
    let mut mqtt: SharedLink = Arc::new(Mutex::new(link));
    let mut supervisor = ConnectionSupervisor::new(config.reconnect);
    supervisor.start(clock.uptime_ms(), &mut mqtt, &mut sink);

    // ── 5. Motion interrupt + alert task ──────────────────────
    let timers = TimerService::new().map_err(Error::from)?;
    let alarm_timer = timers
        .one_shot(|| {
            alarm::on_expired(ALERT_STATE.flags(), &mut LogEventSink);
        })
        .map_err(Error::from)?;

    let (notifier_tx, notifier_rx) = mpsc::sync_channel(1);
    {
        let config = config.clone();
        let mqtt = mqtt.clone();
        let display = display.clone();
        let pir = peripherals.pins.gpio5;
        spawn_on_core(Core::App, ALERT_TASK_PRIORITY, ALERT_TASK_STACK_KB, "alert\0", move || {
            alert_task(pir, config, mqtt, display, alarm_timer, notifier_tx)
        })?;
    }
    let wake = notifier_rx.recv().context("alert task exited during setup")?;

    // ── 6. Sound poll ─────────────────────────────────────────
    SOUND_MONITOR.set_threshold(config.sound_threshold);
    let _sound_poll = timers
        .periodic(config.sound_poll_interval_ms, move || {
            let outcome = SOUND_MONITOR.poll(&ALERT_STATE, &mut Microphone, uptime_ms32());
            if let PollOutcome::Loud { outcome: TriggerOutcome::Accepted, .. } = outcome {
                // SAFETY: the alert task never exits once set up.
                unsafe {
                    wake.notify(NonZeroU32::MIN);
                }
            }
        })
        .map_err(Error::from)?;

    // ── 7. Ready ──────────────────────────────────────────────
    AlertService::new(&ALERT_STATE, &config).complete_setup(&mut sink);

    // ── 8. Main loop ──────────────────────────────────────────
    let observer = MainLoop::new(&ALERT_STATE);
    let watchdog = Watchdog::default();
    let mut delay = FreeRtos;

    loop {
        let branch = observer.iterate(&mut pwm, &mut display, &mut delay);
        debug!("loop: {:?} ({})", branch, ALERT_STATE.phase().name());

        while let Some(status) = statuses.take() {
            supervisor.on_status(status, clock.uptime_ms(), &mut mqtt, &mut sink);
        }
        supervisor.poll(clock.uptime_ms(), &mut mqtt, &mut sink);

        watchdog.feed();
    }
}

/// Build-time config, or the factory values if the overrides are invalid.
fn load_config() -> SystemConfig {
    let config = SystemConfig::default();
    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("Config rejected ({}), using factory defaults", e);
            SystemConfig::factory()
        }
    };
    match config.to_json() {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config dump failed: {}", e),
    }
    config
}

/// Owns the PIR interrupt and runs the blocking half of every trigger.
fn alert_task(
    pir: Gpio5,
    config: SystemConfig,
    mut mqtt: SharedLink,
    mut display: SharedDisplay,
    mut alarm_timer: OneShot,
    notifier_tx: mpsc::SyncSender<Arc<Notifier>>,
) {
    let notification = Notification::new();
    let wake = notification.notifier();

    let mut pir = match arm_pir(pir, wake.clone()) {
        Ok(pir) => Some(pir),
        Err(e) => {
            error!("PIR interrupt setup failed: {}; motion input disabled", e);
            None
        }
    };
    if notifier_tx.send(wake).is_err() {
        return;
    }

    let service = AlertService::new(&ALERT_STATE, &config);
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();

    loop {
        notification.wait(BLOCK);
        while let Some(report) =
            service.drain(&mut mqtt, &mut display, &mut alarm_timer, &clock, &mut sink)
        {
            debug!("alert: {:?}", report);
        }
        // The driver masks the interrupt after every edge.
        if MOTION_MONITOR.take_rearm() {
            if let Some(pir) = pir.as_mut() {
                if let Err(e) = pir.enable_interrupt() {
                    warn!("PIR re-enable failed: {}", e);
                }
            }
        }
    }
}

fn arm_pir(
    pin: Gpio5,
    wake: Arc<Notifier>,
) -> Result<PinDriver<'static, Gpio5, esp_idf_hal::gpio::Input>, esp_idf_svc::sys::EspError> {
    let mut pir = PinDriver::input(pin)?;
    pir.set_pull(Pull::Up)?;
    pir.set_interrupt_type(InterruptType::PosEdge)?;
    // SAFETY: the handler only touches atomics and the task notifier, both
    // interrupt-safe; the alert task owning `wake` never exits.
    unsafe {
        pir.subscribe(move || {
            if MOTION_MONITOR.on_interrupt(&ALERT_STATE, uptime_ms32()).wake {
                wake.notify_and_yield(NonZeroU32::MIN);
            }
        })?;
    }
    pir.enable_interrupt()?;
    info!("PIR armed on GPIO{} (rising edge)", pins::PIR_GPIO);
    Ok(pir)
}
