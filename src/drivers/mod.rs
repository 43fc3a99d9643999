//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod hw_timer;
pub mod ledc;
pub mod oled;
pub mod task_pin;
pub mod tone;
pub mod watchdog;
