//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                     |
//! |------------|------------|---------------------------------|
//! | `log_sink` | EventSink  | Serial log output               |
//! | `mqtt`     | MqttPort   | ESP-IDF MQTT client / loopback  |
//! | `time`     | Clock      | ESP32 system timer              |
//! | `wifi`     |            | ESP-IDF Wi-Fi STA (boot join)   |

pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
