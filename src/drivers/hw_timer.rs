//! Software timers on the ESP-IDF `esp_timer` task.
//!
//! Two timers drive the controller:
//!
//! - the periodic sound poll (200 ms by default), and
//! - the one-shot alarm window, re-armed on every accepted trigger.
//!
//! Callbacks execute in the esp_timer task context (not ISR), so they may
//! log and take short locks.  On simulation targets each timer is a plain
//! thread sleeping between firings.

use std::sync::Arc;

#[cfg(target_os = "espidf")]
use core::time::Duration;
#[cfg(target_os = "espidf")]
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};

#[cfg(not(target_os = "espidf"))]
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::app::ports::OneShotTimer;
use crate::error::TimerError;

type Callback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Factory for the controller's timers.
#[derive(Clone)]
pub struct TimerService {
    #[cfg(target_os = "espidf")]
    inner: EspTaskTimerService,
}

impl TimerService {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Result<Self, TimerError> {
        let inner = EspTaskTimerService::new().map_err(|e| TimerError::CreateFailed(e.code()))?;
        Ok(Self { inner })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Result<Self, TimerError> {
        Ok(Self {})
    }

    /// Build an idle one-shot that runs `on_expiry` each time it elapses.
    pub fn one_shot(
        &self,
        on_expiry: impl Fn() + Send + Sync + 'static,
    ) -> Result<OneShot, TimerError> {
        let callback: Callback = Arc::new(on_expiry);

        #[cfg(target_os = "espidf")]
        {
            let timer = self
                .inner
                .timer(move || callback())
                .map_err(|e| TimerError::CreateFailed(e.code()))?;
            Ok(OneShot { timer })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            Ok(OneShot { callback, generation: Arc::new(AtomicU32::new(0)) })
        }
    }

    /// Start a timer that runs `on_tick` every `period_ms` until dropped.
    pub fn periodic(
        &self,
        period_ms: u32,
        on_tick: impl Fn() + Send + Sync + 'static,
    ) -> Result<Periodic, TimerError> {
        #[cfg(target_os = "espidf")]
        {
            let timer = self
                .inner
                .timer(on_tick)
                .map_err(|e| TimerError::CreateFailed(e.code()))?;
            timer
                .every(Duration::from_millis(u64::from(period_ms)))
                .map_err(|e| TimerError::StartFailed(e.code()))?;
            log::info!("hw_timer: periodic timer started ({} ms)", period_ms);
            Ok(Periodic { _timer: timer })
        }

        #[cfg(not(target_os = "espidf"))]
        {
            let running = Arc::new(AtomicBool::new(true));
            let flag = running.clone();
            std::thread::Builder::new()
                .name("sim-periodic".into())
                .spawn(move || {
                    while flag.load(Ordering::Acquire) {
                        std::thread::sleep(std::time::Duration::from_millis(u64::from(period_ms)));
                        if flag.load(Ordering::Acquire) {
                            on_tick();
                        }
                    }
                })
                .map_err(|_| TimerError::StartFailed(-1))?;
            Ok(Periodic { running })
        }
    }
}

/// Re-armable one-shot.  Starting it while pending restarts the countdown.
pub struct OneShot {
    #[cfg(target_os = "espidf")]
    timer: EspTimer<'static>,
    #[cfg(not(target_os = "espidf"))]
    callback: Callback,
    #[cfg(not(target_os = "espidf"))]
    generation: Arc<AtomicU32>,
}

impl OneShotTimer for OneShot {
    #[cfg(target_os = "espidf")]
    fn start_once(&mut self, after_ms: u32) -> Result<(), TimerError> {
        // esp_timer refuses to restart a pending timer.
        let _ = self.timer.cancel();
        self.timer
            .after(Duration::from_millis(u64::from(after_ms)))
            .map_err(|e| TimerError::StartFailed(e.code()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn start_once(&mut self, after_ms: u32) -> Result<(), TimerError> {
        let callback = self.callback.clone();
        let generation = self.generation.clone();
        let armed = generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        std::thread::Builder::new()
            .name("sim-oneshot".into())
            .spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(u64::from(after_ms)));
                // A later start superseded this countdown.
                if generation.load(Ordering::Acquire) == armed {
                    callback();
                }
            })
            .map(|_| ())
            .map_err(|_| TimerError::StartFailed(-1))
    }
}

/// Handle to a running periodic timer.  Dropping it stops the timer.
pub struct Periodic {
    #[cfg(target_os = "espidf")]
    _timer: EspTimer<'static>,
    #[cfg(not(target_os = "espidf"))]
    running: Arc<AtomicBool>,
}

#[cfg(not(target_os = "espidf"))]
impl Drop for Periodic {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
