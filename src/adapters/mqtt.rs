//! MQTT link adapter.
//!
//! Implements [`MqttPort`] over `esp_idf_svc::mqtt::client::EspMqttClient`.
//! Every `connect()` drops the previous client and builds a fresh one, so
//! one connect call always means one new session attempt.  A receiver
//! thread per client turns connection events into [`ConnectionStatus`]
//! reports and queues them on a [`StatusFeed`]; the main loop drains the
//! feed into the connection supervisor.  The receiver never calls back into
//! the client, which would deadlock the esp-mqtt task.
//!
//! Reports from a superseded client are discarded by generation number.
//!
//! On non-ESP targets a loopback broker answers each connect with the next
//! scripted status and records every publish.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::app::connection::ConnectionStatus;
use crate::app::ports::{MqttPort, QoS};
use crate::config::SystemConfig;
use crate::error::CommsError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};

/// Pending status reports.  Four covers a reject/disconnect burst between
/// two main-loop iterations.
const STATUS_DEPTH: usize = 4;

type StatusChannel = Channel<CriticalSectionRawMutex, ConnectionStatus, STATUS_DEPTH>;

// ───────────────────────────────────────────────────────────────
// Status feed
// ───────────────────────────────────────────────────────────────

/// Read side of the connection-status queue.
#[derive(Clone)]
pub struct StatusFeed {
    channel: Arc<StatusChannel>,
}

impl StatusFeed {
    fn new() -> Self {
        Self { channel: Arc::new(Channel::new()) }
    }

    pub fn take(&self) -> Option<ConnectionStatus> {
        self.channel.try_receive().ok()
    }

    fn push(&self, status: ConnectionStatus) {
        if self.channel.try_send(status).is_err() {
            warn!("mqtt: status queue full, dropping {:?}", status);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Link
// ───────────────────────────────────────────────────────────────

pub struct MqttLink {
    url: heapless::String<80>,
    client_id: heapless::String<23>,
    keep_alive_secs: u16,
    feed: StatusFeed,
    connected: Arc<AtomicBool>,
    generation: Arc<AtomicU32>,
    #[cfg(target_os = "espidf")]
    client: Option<EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimBroker,
}

/// Loopback broker for host builds.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimBroker {
    /// Answers to successive connects; `Accepted` once exhausted.
    pub script: std::collections::VecDeque<ConnectionStatus>,
    /// Connect calls that fail before a client exists.
    pub create_failures: u32,
    pub fail_publish: bool,
    pub published: Vec<SimPublish>,
    pub connects: u32,
    has_client: bool,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimPublish {
    pub topic: String,
    pub payload: Vec<u8>,
    pub qos: QoS,
    pub retain: bool,
}

impl MqttLink {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            url: config.broker_url(),
            client_id: config.client_id.clone(),
            keep_alive_secs: config.keep_alive_secs,
            feed: StatusFeed::new(),
            connected: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU32::new(0)),
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            sim: SimBroker::default(),
        }
    }

    pub fn status_feed(&self) -> StatusFeed {
        self.feed.clone()
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim(&mut self) -> &mut SimBroker {
        &mut self.sim
    }

    /// Simulate the broker dropping an established session.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop_session(&mut self) {
        self.connected.store(false, Ordering::Release);
        self.feed.push(ConnectionStatus::Disconnected);
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, generation: u32) -> Result<(), CommsError> {
        use core::time::Duration;

        // Tear down the old session before its replacement exists.
        self.client = None;

        let conf = MqttClientConfiguration {
            client_id: Some(self.client_id.as_str()),
            keep_alive_interval: Some(Duration::from_secs(u64::from(self.keep_alive_secs))),
            ..Default::default()
        };
        let (client, mut conn) = EspMqttClient::new(self.url.as_str(), &conf).map_err(|e| {
            warn!("mqtt: client create failed: {e}");
            CommsError::MqttClientCreateFailed
        })?;

        let feed = self.feed.clone();
        let connected = self.connected.clone();
        let current = self.generation.clone();
        std::thread::Builder::new()
            .name("mqtt-rx".into())
            .stack_size(6 * 1024)
            .spawn(move || {
                while let Ok(event) = conn.next() {
                    if current.load(Ordering::Acquire) != generation {
                        continue;
                    }
                    match event.payload() {
                        EventPayload::Connected(_) => {
                            connected.store(true, Ordering::Release);
                            feed.push(ConnectionStatus::Accepted);
                        }
                        EventPayload::Disconnected => {
                            connected.store(false, Ordering::Release);
                            feed.push(ConnectionStatus::Disconnected);
                        }
                        EventPayload::Error(e) => warn!("mqtt: client error: {e:?}"),
                        _ => {}
                    }
                }
                log::debug!("mqtt-rx: connection {} closed", generation);
            })
            .map_err(|_| CommsError::MqttClientCreateFailed)?;

        self.client = Some(client);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, _generation: u32) -> Result<(), CommsError> {
        self.sim.connects += 1;
        self.sim.has_client = false;
        if self.sim.create_failures > 0 {
            self.sim.create_failures -= 1;
            return Err(CommsError::MqttClientCreateFailed);
        }
        self.sim.has_client = true;
        let status = self.sim.script.pop_front().unwrap_or(ConnectionStatus::Accepted);
        self.connected.store(status.is_accepted(), Ordering::Release);
        self.feed.push(status);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn has_client(&self) -> bool {
        self.client.is_some()
    }

    #[cfg(not(target_os = "espidf"))]
    fn has_client(&self) -> bool {
        self.sim.has_client
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::QoS as EspQoS;

        let qos = match qos {
            QoS::AtMostOnce => EspQoS::AtMostOnce,
            QoS::AtLeastOnce => EspQoS::AtLeastOnce,
            QoS::ExactlyOnce => EspQoS::ExactlyOnce,
        };
        let client = self.client.as_mut().ok_or(CommsError::MqttNotConnected)?;
        client.publish(topic, qos, retain, payload).map(|_| ()).map_err(|e| {
            warn!("mqtt: publish failed: {e}");
            CommsError::MqttPublishFailed
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), CommsError> {
        if self.sim.fail_publish {
            return Err(CommsError::MqttPublishFailed);
        }
        self.sim.published.push(SimPublish {
            topic: topic.into(),
            payload: payload.to_vec(),
            qos,
            retain,
        });
        Ok(())
    }
}

impl MqttPort for MqttLink {
    fn connect(&mut self) -> Result<(), CommsError> {
        self.connected.store(false, Ordering::Release);
        let generation = self.generation.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        info!("mqtt: connecting to {} as '{}' (session {})", self.url, self.client_id, generation);
        self.platform_connect(generation)
    }

    fn is_connected(&self) -> bool {
        self.has_client() && self.connected.load(Ordering::Acquire)
    }

    fn publish(
        &mut self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<(), CommsError> {
        if !self.is_connected() {
            return Err(CommsError::MqttNotConnected);
        }
        self.platform_publish(topic, payload, qos, retain)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
