//! Broker link supervision against the mock link.

use intrusion_alert::app::connection::{ConnectionStatus, ConnectionSupervisor, LinkState, Reaction};
use intrusion_alert::app::events::AppEvent;
use intrusion_alert::config::ReconnectPolicy;

use crate::mock_hw::{MockLink, RecordingSink};

const REJECTIONS: [ConnectionStatus; 6] = [
    ConnectionStatus::RefusedProtocolVersion,
    ConnectionStatus::RefusedIdentifier,
    ConnectionStatus::RefusedServerUnavailable,
    ConnectionStatus::RefusedBadCredentials,
    ConnectionStatus::RefusedNotAuthorized,
    ConnectionStatus::Timeout,
];

#[test]
fn every_rejection_gets_exactly_one_reconnect() {
    let (mut link, mut sink) = (MockLink::default(), RecordingSink::default());
    let mut sup = ConnectionSupervisor::new(ReconnectPolicy::Immediate);
    sup.start(0, &mut link, &mut sink);

    for (i, status) in REJECTIONS.iter().enumerate() {
        let r = sup.on_status(*status, i as u64, &mut link, &mut sink);
        assert_eq!(r, Reaction::Reconnected { attempt: i as u32 + 1 });
    }

    assert_eq!(link.connect_calls, REJECTIONS.len() as u32 + 1);
    assert_eq!(sup.rejections(), REJECTIONS.len() as u32);
    assert_eq!(sup.reconnect_attempts(), REJECTIONS.len() as u32);
    assert_eq!(sink.count(&AppEvent::MqttReconnecting { attempt: 3 }), 1);
    assert_eq!(sup.state(), LinkState::Connecting);
}

#[test]
fn rejection_logs_code_before_the_retry_line() {
    let (mut link, mut sink) = (MockLink::default(), RecordingSink::default());
    let mut sup = ConnectionSupervisor::new(ReconnectPolicy::Immediate);
    sup.start(0, &mut link, &mut sink);
    sup.on_status(ConnectionStatus::RefusedBadCredentials, 1, &mut link, &mut sink);

    assert_eq!(
        sink.lines(),
        vec!["Falha na conexão MQTT, Status:4", "Tentando conectar tudo novamente..."]
    );
}

#[test]
fn accepted_after_rejections_is_logged_and_stops_retrying() {
    let (mut link, mut sink) = (MockLink::default(), RecordingSink::default());
    let mut sup = ConnectionSupervisor::new(ReconnectPolicy::Immediate);
    sup.start(0, &mut link, &mut sink);
    sup.on_status(ConnectionStatus::RefusedServerUnavailable, 1, &mut link, &mut sink);
    sup.on_status(ConnectionStatus::Accepted, 2, &mut link, &mut sink);

    assert_eq!(sup.state(), LinkState::Connected);
    assert_eq!(sink.lines().last().map(String::as_str), Some("Conexão MQTT bem-sucedida!"));
    assert!(!sup.poll(10_000, &mut link, &mut sink));
    assert_eq!(link.connect_calls, 2);
}

#[test]
fn dropped_session_is_treated_like_a_rejection() {
    let (mut link, mut sink) = (MockLink::default(), RecordingSink::default());
    let mut sup = ConnectionSupervisor::new(ReconnectPolicy::Immediate);
    sup.start(0, &mut link, &mut sink);
    sup.on_status(ConnectionStatus::Accepted, 1, &mut link, &mut sink);

    let r = sup.on_status(ConnectionStatus::Disconnected, 2, &mut link, &mut sink);
    assert_eq!(r, Reaction::Reconnected { attempt: 1 });
    assert!(sink.events.contains(&AppEvent::MqttRejected(ConnectionStatus::Disconnected)));
}

#[test]
fn client_creation_failures_are_retried_from_poll() {
    let mut link = MockLink { create_failures: 2, ..MockLink::default() };
    let mut sink = RecordingSink::default();
    let mut sup = ConnectionSupervisor::new(ReconnectPolicy::Immediate);

    sup.start(0, &mut link, &mut sink);
    assert!(matches!(sup.state(), LinkState::RetryPending { .. }));
    assert!(sup.poll(1, &mut link, &mut sink));
    assert!(matches!(sup.state(), LinkState::RetryPending { .. }));
    assert!(sup.poll(2, &mut link, &mut sink));

    assert_eq!(sup.state(), LinkState::Connecting);
    assert_eq!(link.connect_calls, 3);
    assert_eq!(sink.count(&AppEvent::MqttClientCreateFailed), 2);
}

#[test]
fn backoff_defers_reconnects_until_the_deadline() {
    let (mut link, mut sink) = (MockLink::default(), RecordingSink::default());
    let mut sup =
        ConnectionSupervisor::new(ReconnectPolicy::Backoff { initial_ms: 500, max_ms: 4_000 });
    sup.start(0, &mut link, &mut sink);

    let r = sup.on_status(ConnectionStatus::Timeout, 100, &mut link, &mut sink);
    assert_eq!(r, Reaction::RetryScheduled { delay_ms: 500 });
    assert_eq!(link.connect_calls, 1);
    assert!(!sup.poll(599, &mut link, &mut sink));
    assert!(sup.poll(600, &mut link, &mut sink));
    assert_eq!(link.connect_calls, 2);

    let r = sup.on_status(ConnectionStatus::Timeout, 700, &mut link, &mut sink);
    assert_eq!(r, Reaction::RetryScheduled { delay_ms: 1_000 });
}
