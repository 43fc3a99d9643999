//! Fuzz target: `SystemConfig` JSON handling
//!
//! Feeds arbitrary bytes to the config deserializer and verifies:
//! - No panics on malformed or oversized fields
//! - `validate` and `broker_url` accept anything that parsed
//! - A valid config re-serialises without the passphrase
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use intrusion_alert::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(config) = serde_json::from_slice::<SystemConfig>(data) else {
        return;
    };

    let url = config.broker_url();
    assert!(url.starts_with("mqtt://"));

    if config.validate().is_ok() {
        let json = config.to_json().expect("valid config serialises");
        assert!(!json.contains("wifi_passphrase"));
    }
});
