//! Integration tests for the publish attempt.

use std::sync::atomic::{AtomicBool, Ordering};

use intrusion_alert::app::events::AppEvent;
use intrusion_alert::app::notifier::{CONFIRMATION_POS, CONFIRMATION_TEXT, Notifier, NotifyOutcome};
use intrusion_alert::app::ports::QoS;
use intrusion_alert::config::SystemConfig;
use intrusion_alert::error::CommsError;
use intrusion_alert::events::{AlertEvent, TriggerOutcome};
use intrusion_alert::fsm::flags::FlagSnapshot;
use intrusion_alert::fsm::{AlertState, SystemPhase};

use crate::mock_hw::{DisplayCall, MockDisplay, MockLink, RecordingSink};

const ALERTING: FlagSnapshot =
    FlagSnapshot { initializing: false, alarm_active: true, sending: false };
const IDLE: FlagSnapshot = FlagSnapshot { initializing: false, alarm_active: false, sending: false };

#[test]
fn sent_alert_is_logged_and_confirmed_on_screen() {
    let state = AlertState::with_flags(ALERTING);
    let notifier = Notifier::new(&SystemConfig::factory());
    let (mut link, mut display, mut sink) =
        (MockLink::connected(), MockDisplay::default(), RecordingSink::default());

    let out = notifier.notify(state.flags(), 86_400_000 + 5_000, &mut link, &mut display, &mut sink);

    assert_eq!(out, NotifyOutcome::Sent);
    assert_eq!(link.published.len(), 1);
    assert_eq!(link.published[0].topic, "Alerta");
    assert_eq!(link.published[0].qos, QoS::AtLeastOnce);
    assert!(!link.published[0].retain);
    assert_eq!(
        link.published[0].payload,
        "Um Alerta foi detectado no dispositivo X no dia 1 às 00:00:05"
    );
    assert_eq!(
        display.calls,
        vec![
            DisplayCall::Clear,
            DisplayCall::Text {
                x: CONFIRMATION_POS.0,
                y: CONFIRMATION_POS.1,
                text: CONFIRMATION_TEXT.into(),
            },
        ]
    );
    assert!(matches!(sink.events.as_slice(), [AppEvent::MessageSent { .. }]));
    assert!(!state.flags().sending());
}

#[test]
fn broker_error_is_logged_without_retry() {
    let state = AlertState::with_flags(ALERTING);
    let notifier = Notifier::new(&SystemConfig::factory());
    let mut link = MockLink { publish_error: Some(CommsError::MqttPublishFailed), ..MockLink::connected() };
    let (mut display, mut sink) = (MockDisplay::default(), RecordingSink::default());

    let out = notifier.notify(state.flags(), 0, &mut link, &mut display, &mut sink);

    assert_eq!(out, NotifyOutcome::Failed(CommsError::MqttPublishFailed));
    assert_eq!(sink.lines(), vec!["Erro ao enviar mensagem !"]);
    assert!(display.calls.is_empty());
    assert_eq!(link.connect_calls, 0);
    assert!(!state.flags().sending());
}

#[test]
fn custom_topic_and_device_label_are_used() {
    let mut config = SystemConfig::factory();
    config.alert_topic.clear();
    config.alert_topic.push_str("casa/alarme").unwrap();
    config.device_name.clear();
    config.device_name.push_str("garagem").unwrap();
    let notifier = Notifier::new(&config);
    let state = AlertState::with_flags(ALERTING);
    let (mut link, mut display, mut sink) =
        (MockLink::connected(), MockDisplay::default(), RecordingSink::default());

    notifier.notify(state.flags(), 0, &mut link, &mut display, &mut sink);

    assert_eq!(link.published[0].topic, "casa/alarme");
    assert!(link.published[0].payload.contains("dispositivo garagem"));
}

// ── Send window ───────────────────────────────────────────────

static SEND_STATE: AlertState = AlertState::with_flags(IDLE);
static SAW_SENDING: AtomicBool = AtomicBool::new(false);
static SAW_SUPPRESSED: AtomicBool = AtomicBool::new(false);

#[test]
fn triggers_during_a_publish_are_suppressed() {
    let notifier = Notifier::new(&SystemConfig::factory());
    let mut link = MockLink::connected();
    link.during_publish = Some(Box::new(|| {
        SAW_SENDING.store(SEND_STATE.flags().sending(), Ordering::SeqCst);
        let outcome = SEND_STATE.submit(AlertEvent::motion(1));
        SAW_SUPPRESSED.store(
            outcome == TriggerOutcome::Suppressed(SystemPhase::Alerting),
            Ordering::SeqCst,
        );
    }));
    let (mut display, mut sink) = (MockDisplay::default(), RecordingSink::default());

    notifier.notify(SEND_STATE.flags(), 0, &mut link, &mut display, &mut sink);

    assert!(SAW_SENDING.load(Ordering::SeqCst));
    assert!(SAW_SUPPRESSED.load(Ordering::SeqCst));
    assert!(!SEND_STATE.flags().sending());
    assert!(SEND_STATE.mailbox().is_empty());
    // Once the attempt is over the guard reopens.
    assert!(SEND_STATE.submit(AlertEvent::motion(2)).is_accepted());
}
