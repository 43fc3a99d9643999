//! Integration tests for the trigger path: sensor monitor → AlertState →
//! AlertService → alarm timer / notifier / display.

use intrusion_alert::app::events::AppEvent;
use intrusion_alert::app::notifier::{CONFIRMATION_TEXT, NotifyOutcome};
use intrusion_alert::app::ports::{QoS, SoundLevelPort};
use intrusion_alert::app::service::AlertService;
use intrusion_alert::config::SystemConfig;
use intrusion_alert::error::{CommsError, TimerError};
use intrusion_alert::events::{AlertEvent, AlertSource, TriggerOutcome};
use intrusion_alert::fsm::flags::FlagSnapshot;
use intrusion_alert::fsm::{AlertState, SystemPhase};
use intrusion_alert::sensors::motion::MotionMonitor;
use intrusion_alert::sensors::sound::{PollOutcome, SoundMonitor};

use crate::mock_hw::{
    DisplayCall, MockClock, MockDisplay, MockLink, MockTimer, RecordingSink,
};

const IDLE: FlagSnapshot = FlagSnapshot { initializing: false, alarm_active: false, sending: false };

struct Level(u16);

impl SoundLevelPort for Level {
    fn sample(&mut self) -> u16 {
        self.0
    }
}

struct Rig {
    link: MockLink,
    display: MockDisplay,
    timer: MockTimer,
    clock: MockClock,
    sink: RecordingSink,
}

impl Rig {
    fn new() -> Self {
        Self {
            link: MockLink::connected(),
            display: MockDisplay::default(),
            timer: MockTimer::default(),
            clock: MockClock(3_723_000),
            sink: RecordingSink::default(),
        }
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn setup_completion_is_announced_once_and_opens_the_guard() {
    let state = AlertState::new();
    let config = SystemConfig::factory();
    let service = AlertService::new(&state, &config);
    let mut sink = RecordingSink::default();

    assert_eq!(state.phase(), SystemPhase::Initializing);
    assert!(service.complete_setup(&mut sink));
    assert!(!service.complete_setup(&mut sink));

    assert_eq!(state.phase(), SystemPhase::Idle);
    assert_eq!(sink.events, vec![AppEvent::InitComplete]);
    assert_eq!(sink.lines(), vec!["Inicialização concluida com sucesso !"]);
}

#[test]
fn triggers_before_setup_are_ignored() {
    let state = AlertState::new();
    let pir = MotionMonitor::new();
    assert_eq!(
        pir.on_rising_edge(&state, 0),
        TriggerOutcome::Suppressed(SystemPhase::Initializing)
    );
    assert!(state.mailbox().is_empty());
    assert!(!state.flags().alarm_active());
}

// ── Full trigger path ─────────────────────────────────────────

#[test]
fn motion_runs_detect_arm_notify_clear_in_order() {
    let state = AlertState::with_flags(IDLE);
    let config = SystemConfig::factory();
    let service = AlertService::new(&state, &config);
    let mut rig = Rig::new();

    let at = rig.clock.0 as u32;
    assert!(MotionMonitor::new().on_rising_edge(&state, at).is_accepted());
    let report = service
        .drain(&mut rig.link, &mut rig.display, &mut rig.timer, &rig.clock, &mut rig.sink)
        .expect("event pending");

    assert_eq!(report.source, AlertSource::Motion);
    assert_eq!(report.timer_ms, Some(10_000));
    assert_eq!(report.notify, NotifyOutcome::Sent);
    assert_eq!(rig.timer.started, vec![10_000]);

    let lines = rig.sink.lines();
    assert_eq!(lines[0], "Movimento detectado!");
    assert_eq!(lines[1], "Alarme disparado!");
    assert_eq!(
        lines[2],
        "Mensagem enviada - Tópico: Alerta, Messagem: \
         Um Alerta foi detectado no dispositivo X no dia 0 às 01:02:03"
    );

    let sent = &rig.link.published[0];
    assert_eq!(sent.topic, "Alerta");
    assert_eq!(sent.qos, QoS::AtLeastOnce);
    assert!(!sent.retain);

    // Confirmation shown, then the trigger path clears the panel.
    assert_eq!(
        rig.display.calls,
        vec![
            DisplayCall::Clear,
            DisplayCall::Text { x: 8, y: 16, text: CONFIRMATION_TEXT.into() },
            DisplayCall::Clear,
        ]
    );

    assert!(state.flags().alarm_active());
    assert!(!state.flags().sending());
    assert_eq!(state.phase(), SystemPhase::Alerting);
}

#[test]
fn loud_sample_takes_the_same_path_with_sound_source() {
    let state = AlertState::with_flags(IDLE);
    let config = SystemConfig::factory();
    let service = AlertService::new(&state, &config);
    let mut rig = Rig::new();

    let polled = SoundMonitor::new(config.sound_threshold).poll(&state, &mut Level(3000), 0);
    assert!(matches!(polled, PollOutcome::Loud { level: 3000, outcome: TriggerOutcome::Accepted }));

    let report = service
        .drain(&mut rig.link, &mut rig.display, &mut rig.timer, &rig.clock, &mut rig.sink)
        .expect("event pending");
    assert_eq!(report.source, AlertSource::Sound { level: 3000 });
    assert_eq!(rig.sink.events[0], AppEvent::LoudSoundDetected { level: 3000 });
    assert_eq!(rig.sink.lines()[0], "Som alto detectado!");
    assert_eq!(rig.link.published.len(), 1);
}

#[test]
fn empty_mailbox_drains_to_nothing() {
    let state = AlertState::with_flags(IDLE);
    let config = SystemConfig::factory();
    let service = AlertService::new(&state, &config);
    let mut rig = Rig::new();
    assert!(
        service
            .drain(&mut rig.link, &mut rig.display, &mut rig.timer, &rig.clock, &mut rig.sink)
            .is_none()
    );
    assert!(rig.sink.events.is_empty());
}

// ── Alarm deadline ────────────────────────────────────────────

#[test]
fn timer_covers_only_the_rest_of_the_window() {
    let state = AlertState::with_flags(IDLE);
    let config = SystemConfig::factory();
    let service = AlertService::new(&state, &config);
    let mut rig = Rig::new();

    // Claimed 1.5 s before the alert task got to it.
    let claimed_at = rig.clock.0 as u32 - 1_500;
    let report = service.handle(
        AlertEvent::motion(claimed_at),
        &mut rig.link,
        &mut rig.display,
        &mut rig.timer,
        &rig.clock,
        &mut rig.sink,
    );
    assert_eq!(report.timer_ms, Some(8_500));
}

#[test]
fn timer_start_failure_closes_the_window() {
    let state = AlertState::with_flags(IDLE);
    let config = SystemConfig::factory();
    let service = AlertService::new(&state, &config);
    let mut rig = Rig::new();
    rig.timer.fail = Some(TimerError::StartFailed(-1));

    assert!(state.submit(AlertEvent::motion(rig.clock.0 as u32)).is_accepted());
    let report = service
        .drain(&mut rig.link, &mut rig.display, &mut rig.timer, &rig.clock, &mut rig.sink)
        .expect("event pending");

    assert_eq!(report.timer_ms, None);
    assert!(!state.flags().alarm_active());
    assert!(rig.sink.events.contains(&AppEvent::AlarmTimerFailed(TimerError::StartFailed(-1))));
    assert!(rig.sink.events.contains(&AppEvent::AlarmDisarmed));
    // The alert still goes out.
    assert_eq!(report.notify, NotifyOutcome::Sent);
}

// ── Degraded network ──────────────────────────────────────────

#[test]
fn offline_alert_is_logged_once_and_not_retried() {
    let state = AlertState::with_flags(IDLE);
    let config = SystemConfig::factory();
    let service = AlertService::new(&state, &config);
    let mut rig = Rig::new();
    rig.link.connected = false;

    assert!(state.submit(AlertEvent::motion(0)).is_accepted());
    let report = service
        .drain(&mut rig.link, &mut rig.display, &mut rig.timer, &rig.clock, &mut rig.sink)
        .expect("event pending");

    assert_eq!(report.notify, NotifyOutcome::Failed(CommsError::MqttNotConnected));
    assert_eq!(rig.sink.count(&AppEvent::MessageFailed(CommsError::MqttNotConnected)), 1);
    assert!(rig.link.published.is_empty());
    assert!(!rig.display.showed(CONFIRMATION_TEXT));
    // Window stays open; only the timer closes it.
    assert!(state.flags().alarm_active());
}
