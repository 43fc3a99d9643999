//! Outbound application events.
//!
//! The alert service, connection supervisor and alarm timer emit these
//! through the [`EventSink`](super::ports::EventSink) port.  `Display`
//! renders the operator-facing console line; the text matches what the
//! deployed devices have always printed.

use core::fmt;

use crate::app::connection::ConnectionStatus;
use crate::error::{CommsError, TimerError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Startup finished; triggers are now accepted.
    InitComplete,

    MotionDetected,
    LoudSoundDetected { level: u16 },

    /// The alarm window opened; the timer closes it after `duration_ms`.
    AlarmArmed { duration_ms: u32 },
    AlarmDisarmed,
    /// The one-shot could not be started, so the window was closed at once.
    AlarmTimerFailed(TimerError),

    MessageSent { topic: heapless::String<32>, payload: heapless::String<128> },
    MessageFailed(CommsError),

    WifiConnecting,
    WifiConnected { ip: [u8; 4] },
    WifiFailed(CommsError),

    MqttConnected,
    MqttRejected(ConnectionStatus),
    MqttReconnecting { attempt: u32 },
    MqttClientCreateFailed,
}

impl AppEvent {
    /// Failures are logged at `warn`, everything else at `info`.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::AlarmTimerFailed(_)
                | Self::MessageFailed(_)
                | Self::WifiFailed(_)
                | Self::MqttRejected(_)
                | Self::MqttClientCreateFailed
        )
    }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitComplete => write!(f, "Inicialização concluida com sucesso !"),
            Self::MotionDetected => write!(f, "Movimento detectado!"),
            Self::LoudSoundDetected { .. } => write!(f, "Som alto detectado!"),
            Self::AlarmArmed { .. } => write!(f, "Alarme disparado!"),
            Self::AlarmDisarmed => write!(f, "Alarme desligado !"),
            Self::AlarmTimerFailed(e) => write!(f, "Falha no temporizador do alarme: {e}"),
            Self::MessageSent { topic, payload } => {
                write!(f, "Mensagem enviada - Tópico: {topic}, Messagem: {payload}")
            }
            Self::MessageFailed(_) => write!(f, "Erro ao enviar mensagem !"),
            Self::WifiConnecting => write!(f, "Connecting to Wi-Fi..."),
            Self::WifiConnected { ip: [a, b, c, d] } => {
                write!(f, "Connected.\nIP address {a}.{b}.{c}.{d}")
            }
            Self::WifiFailed(_) => write!(f, "failed to connect."),
            Self::MqttConnected => write!(f, "Conexão MQTT bem-sucedida!"),
            Self::MqttRejected(status) => {
                write!(f, "Falha na conexão MQTT, Status:{}", status.code())
            }
            Self::MqttReconnecting { .. } => write!(f, "Tentando conectar tudo novamente..."),
            Self::MqttClientCreateFailed => write!(f, "Falha ao criar cliente MQTT"),
        }
    }
}
