//! Application core: pure domain logic, zero I/O.
//!
//! The trigger path ([`service`]), the publish attempt ([`notifier`]), the
//! broker connection supervisor ([`connection`]) and the main-loop observer
//! ([`main_loop`]).  All interaction with hardware happens through the
//! **port traits** in [`ports`], keeping this layer testable without real
//! peripherals.

pub mod connection;
pub mod effects;
pub mod events;
pub mod main_loop;
pub mod notifier;
pub mod ports;
pub mod service;
