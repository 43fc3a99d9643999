//! Sensor monitors: the two independent trigger sources.
//!
//! | Monitor  | Context          | Input                     |
//! |----------|------------------|---------------------------|
//! | `motion` | GPIO ISR         | PIR rising edge           |
//! | `sound`  | esp_timer task   | Microphone ADC, 200 ms    |
//!
//! Both feed [`AlertState::submit`](crate::fsm::AlertState::submit).

pub mod motion;
pub mod sound;
